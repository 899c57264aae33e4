use ss2lib::float;

#[derive(clap::Args, Debug)]
pub struct HexFloatOpts {
    /// Big-endian hex, with or without 0x.
    hex: String,

    /// Read a 64-bit double instead of a 32-bit single.
    #[arg(long)]
    double: bool,

    /// Reverse the byte order first.
    #[arg(long)]
    swap: bool,
}

impl HexFloatOpts {
    fn value(&self) -> Result<f64, float::FloatFormatError> {
        match (self.double, self.swap) {
            (false, false) => float::single(&self.hex),
            (false, true) => float::single_swapped(&self.hex),
            (true, false) => float::double(&self.hex),
            (true, true) => float::double_swapped(&self.hex),
        }
    }
}

impl crate::ToolRun for HexFloatOpts {
    fn run(&self) -> anyhow::Result<()> {
        println!("{}", self.value()?);
        Ok(())
    }
}
