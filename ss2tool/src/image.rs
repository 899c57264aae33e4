use std::path::PathBuf;

use ss2lib::image::{Image, ImageError};
use ss2lib::normalize::normalize;

use crate::common::{create_parent, LogPathArgs};
use crate::logformat::{read_frames, LogFormat};

#[derive(clap::Args, Debug)]
pub struct ImageOpts {
    /// Capture log holding the image frames.
    #[arg(short, long)]
    file: PathBuf,

    // the extension is always replaced with .jpg
    #[command(flatten)]
    log: LogPathArgs,

    /// Capture log format.
    #[arg(short = 't', long = "filetype", value_enum, default_value = "auto")]
    format: LogFormat,

    /// Hex pattern written over missing packets.
    #[arg(long, default_value = "00")]
    filler: String,
}

impl crate::ToolRun for ImageOpts {
    fn run(&self) -> anyhow::Result<()> {
        let filler = normalize(&self.filler, "")
            .map_err(|e| anyhow::anyhow!("bad filler pattern: {}", e))?;

        let frames = read_frames(&self.file, self.format)?;
        if frames.is_empty() {
            eprintln!("no valid data found in file");
            return Ok(());
        }

        let image = match Image::reassemble_hex(&frames, "", &filler) {
            Ok(image) => image,
            Err(ImageError::NoData) => {
                eprintln!("no image data found");
                return Ok(());
            }
        };

        let path = self.log.resolve(Some(&self.file), Some("jpg"))?;
        create_parent(&path)?;
        std::fs::write(&path, image.as_bytes())?;

        if !image.missing().is_empty() {
            eprintln!(
                "{} of {} packets missing, filled: {:?}",
                image.missing().len(),
                image.slots(),
                image.missing()
            );
        }
        eprintln!("image read successfully");
        eprintln!("log file created: {}", path.display());
        Ok(())
    }
}
