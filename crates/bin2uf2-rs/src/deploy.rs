use std::{
    fs::{self, File},
    io::BufWriter,
    path::{Path, PathBuf},
};

use bin2uf2_core::{EncodeOptions, boards::BoardInfo};
use log::{debug, info};
use sysinfo::Disks;

use crate::convert::{read_image, write_image};

// Every UF2 bootloader drive carries this file in its root
const UF2_INFO_FILE: &str = "INFO_UF2.TXT";

// The bootloader flashes any .uf2 file copied onto the drive, the name is not significant
const DEPLOY_FILE_NAME: &str = "out.uf2";

pub fn deploy<P: AsRef<Path>>(
    input_path: P,
    board: &dyn BoardInfo,
    options: &EncodeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let input_path = input_path.as_ref();
    let image = read_image(input_path, board, options)?;

    let uf2_drive = find_uf2_drive().ok_or("Unable to find a mounted UF2 drive")?;

    let output_path = deploy_path(&uf2_drive);

    let output = BufWriter::new(File::create(&output_path)?);

    write_image(
        &image,
        output,
        &output_path,
        options,
        "Transferring program to microcontroller",
    )?;

    info!("Deployed to {}", output_path.display());

    Ok(())
}

fn deploy_path(uf2_drive: &Path) -> PathBuf {
    uf2_drive.join(DEPLOY_FILE_NAME)
}

fn find_uf2_drive() -> Option<PathBuf> {
    let disks = Disks::new_with_refreshed_list();

    for disk in &disks {
        let mount = disk.mount_point();
        let info_file = mount.join(UF2_INFO_FILE);

        if info_file.is_file() {
            info!("Found UF2 drive {}", mount.to_string_lossy());
            log_drive_info(&info_file);
            return Some(mount.to_owned());
        }
    }

    None
}

fn log_drive_info(info_file: &Path) {
    match fs::read_to_string(info_file) {
        Ok(contents) => contents
            .lines()
            .filter(|line| !line.trim().is_empty())
            .for_each(|line| debug!("{}", line.trim())),
        Err(err) => debug!("Unable to read {}: {}", info_file.display(), err),
    }
}
