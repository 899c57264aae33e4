use std::path::PathBuf;

use ss2lib::normalize::normalize;
use ss2lib::{DecodeError, Decoder, Generation, Record};

use crate::common::{LogPathArgs, Recorder};
use crate::logformat::{read_frames, LogFormat};

/// Where beacons come from: one string, or a capture log.
#[derive(clap::Args, Debug)]
#[group(required = true, multiple = false)]
pub struct Source {
    /// Hex string of a single beacon.
    #[arg(short = 's', long)]
    hexstring: Option<String>,
    /// Capture log with one beacon per frame.
    #[arg(short, long)]
    file: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct DecodeOpts {
    #[command(flatten)]
    source: Source,

    #[command(flatten)]
    log: LogPathArgs,

    /// Capture log format.
    #[arg(short = 't', long = "filetype", value_enum, default_value = "auto")]
    format: LogFormat,

    /// Delimiter between bytes in the input. Whitespace is always
    /// removed.
    #[arg(short, long, default_value = "")]
    delimiter: String,

    /// Firmware generation of the satellite.
    #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u8).range(1..=2))]
    generation: u8,
}

impl DecodeOpts {
    fn decoder(&self) -> anyhow::Result<Decoder> {
        let generation = Generation::from_number(self.generation)
            .ok_or_else(|| anyhow::anyhow!("unknown generation {}", self.generation))?;
        Ok(Decoder::new(generation))
    }
}

/// Decode one hex frame, logging why if it fails.
fn decode_one(decoder: &Decoder, hex: &str, delimiter: &str) -> Result<Record, DecodeError> {
    let frame = normalize(hex, delimiter)?;
    match decoder.decode_frame(&frame) {
        Ok(record) => {
            log::info!(
                "decoded msgtype {} ({}/{}), {} fields",
                record.msgtype,
                record.messagenum,
                record.messagetotal,
                record.len()
            );
            Ok(record)
        }
        Err(e) => {
            crate::hexdump::debug("  ", &frame);
            Err(e)
        }
    }
}

impl crate::ToolRun for DecodeOpts {
    fn run(&self) -> anyhow::Result<()> {
        let decoder = self.decoder()?;
        log::debug!("decoding as {}", decoder.generation());

        let path = self.log.resolve(self.source.file.as_deref(), None)?;
        let mut recorder = Recorder::new(path);

        if let Some(ref hex) = self.source.hexstring {
            let record = decode_one(&decoder, hex, &self.delimiter)
                .map_err(|e| anyhow::anyhow!("could not decode string: {}", e))?;
            recorder.record(&record)?;
            eprintln!("string successfully read");
            eprintln!("log file created: {}", recorder.path().display());
            return Ok(());
        }

        let Some(ref file) = self.source.file else {
            anyhow::bail!("a file path or hex string is required");
        };

        let frames = read_frames(file, self.format)?;
        if frames.is_empty() {
            eprintln!("no valid data found in file");
            return Ok(());
        }

        for (i, hex) in frames.iter().enumerate() {
            match decode_one(&decoder, hex, &self.delimiter) {
                Ok(record) => {
                    recorder.record(&record)?;
                    eprintln!("  + frame {} successfully read", i + 1);
                }
                Err(e) => log::warn!("frame {}: {}", i + 1, e),
            }
        }

        eprintln!(
            "successfully read {} of {} frames from file",
            recorder.count(),
            frames.len()
        );
        if recorder.count() > 0 {
            eprintln!("log file created: {}", recorder.path().display());
        }
        Ok(())
    }
}
