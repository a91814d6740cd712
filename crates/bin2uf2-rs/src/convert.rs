use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};

use bin2uf2_core::{
    Bin2Uf2Error, EncodeOptions, TargetAddressMode, boards::BoardInfo, encoded_len, write_output,
};
use log::{LevelFilter, debug, info, warn};

use crate::reporter::ProgressBarReporter;

pub fn convert<P1: AsRef<Path>, P2: AsRef<Path>>(
    input_path: &P1,
    output_path: &P2,
    board: &dyn BoardInfo,
    options: &EncodeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let image = read_image(input_path.as_ref(), board, options)?;

    let output_path = output_path.as_ref().with_extension("uf2");
    let output = BufWriter::new(File::create(&output_path)?);

    write_image(&image, output, &output_path, options, "Writing program to disk")?;

    info!("UF2 file created: {}", output_path.display());

    Ok(())
}

/// Reads the whole input image and reports where it is going to land.
pub fn read_image(
    input_path: &Path,
    board: &dyn BoardInfo,
    options: &EncodeOptions,
) -> Result<Vec<u8>, Box<dyn std::error::Error>> {
    let image = fs::read(input_path)?;

    debug!("Read {} bytes from {}", image.len(), input_path.display());

    match options.target_address_mode {
        TargetAddressMode::Constant => info!(
            "Targeting {} flash at {:#010x}",
            board.board_name(),
            options.flash_base_address
        ),
        TargetAddressMode::Sequential => info!(
            "Targeting {} flash at {:#010x} with sequential block addresses",
            board.board_name(),
            options.flash_base_address
        ),
    }

    if !board.fits_in_flash(options.flash_base_address, image.len()) {
        warn!(
            "Image of {} bytes at {:#010x} does not fit in the {:#010x}..{:#010x} flash window of {}",
            image.len(),
            options.flash_base_address,
            board.flash_start(),
            u64::from(board.flash_start()) + u64::from(board.flash_size()),
            board.board_name()
        );
    }

    Ok(image)
}

/// Encodes `image` into `output`, removing `output_path` again if anything fails.
pub fn write_image<W: Write>(
    image: &[u8],
    mut output: W,
    output_path: &Path,
    options: &EncodeOptions,
    message: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let should_print_progress = log::max_level() >= LevelFilter::Info;

    let result = options
        .validate(image.len())
        .and_then(|num_blocks| {
            debug!("Encoding {} UF2 blocks", num_blocks);

            if should_print_progress {
                let len = encoded_len(image.len(), options.block_payload_size).unwrap_or(0) as u64;
                info!("{}", message);
                let mut reporter = ProgressBarReporter::new(len, &mut output);
                let result = write_output(image, &mut reporter, options);
                reporter.finish();
                result
            } else {
                write_output(image, &mut output, options)
            }
        })
        .and_then(|()| output.flush().map_err(Bin2Uf2Error::FailedToWrite));

    if let Err(err) = result {
        drop(output);
        fs::remove_file(output_path)?;
        return Err(Box::new(err));
    }

    Ok(())
}
