use clap::Parser;

mod common;
mod decode;
mod hexdump;
mod hexfloat;
mod image;
mod logformat;

trait ToolRun {
    fn run(&self) -> anyhow::Result<()>;
}

/// Decode SwampSat II beacons and downlinked images.
#[derive(Parser, Debug)]
#[command(version, about)]
struct ToolOptions {
    /// Log more. Repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: ToolCommand,
}

#[derive(clap::Subcommand, Debug)]
enum ToolCommand {
    /// Decode beacons from a hex string or a capture log.
    Decode(decode::DecodeOpts),
    /// Reassemble a JPEG from image frames in a capture log.
    Image(image::ImageOpts),
    /// Decode a single hex word as an IEEE-754 float.
    Hexfloat(hexfloat::HexFloatOpts),
}

impl ToolRun for ToolCommand {
    fn run(&self) -> anyhow::Result<()> {
        use ToolCommand::*;
        match self {
            Decode(o) => o.run(),
            Image(o) => o.run(),
            Hexfloat(o) => o.run(),
        }
    }
}

fn log_level(verbose: u8) -> log::LevelFilter {
    match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    }
}

fn main() -> anyhow::Result<()> {
    let opts = ToolOptions::parse();

    // RUST_LOG, if set, wins over -v
    env_logger::Builder::new()
        .filter_level(log_level(opts.verbose))
        .format_timestamp(None)
        .parse_default_env()
        .init();

    opts.command.run()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        ToolOptions::command().debug_assert();
    }

    #[test]
    fn verbosity() {
        assert_eq!(log_level(0), log::LevelFilter::Warn);
        assert_eq!(log_level(2), log::LevelFilter::Debug);
        assert_eq!(log_level(7), log::LevelFilter::Trace);
    }

    #[test]
    fn parse_decode() {
        let opts = ToolOptions::try_parse_from(["ss2tool", "-vv", "decode", "-s", "c0ffee"]);
        let opts = opts.unwrap();
        assert_eq!(opts.verbose, 2);
        assert!(matches!(opts.command, ToolCommand::Decode(_)));
    }

    #[test]
    fn decode_needs_one_source() {
        assert!(ToolOptions::try_parse_from(["ss2tool", "decode"]).is_err());
        assert!(
            ToolOptions::try_parse_from(["ss2tool", "decode", "-s", "00", "-f", "x.log"]).is_err()
        );
    }
}
