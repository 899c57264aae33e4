use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;

/// Replaced with the user's home directory.
pub const HOME: &str = "[$HOME]";
/// Replaced with the time the tool was run.
pub const TIMESTAMP: &str = "[$TIMESTAMP]";

pub const DEFAULT_LOG: &str = "[$HOME]/ss2logs/ss2beacon_parsed_[$TIMESTAMP].json";
const DEFAULT_NAME: &str = "ss2beacon_parsed_[$TIMESTAMP].json";

/// Where decoded output is written.
#[derive(clap::Args, Debug, Clone)]
pub struct LogPathArgs {
    /// Output file. `[$HOME]` and `[$TIMESTAMP]` are filled in. A
    /// directory, or a path with no extension, gets a default name.
    /// When left as the default and reading a file, output goes next to
    /// that file in `ss2logs/`.
    #[arg(short, long, default_value = DEFAULT_LOG)]
    pub logfile: String,
}

impl LogPathArgs {
    /// Resolve the output path for `input`, with `extension` swapped in
    /// if given.
    pub fn resolve(&self, input: Option<&Path>, extension: Option<&str>) -> anyhow::Result<PathBuf> {
        let home = if self.logfile.contains(HOME) {
            home_dir().ok_or_else(|| anyhow::anyhow!("could not find home directory"))?
        } else {
            PathBuf::new()
        };
        let now = chrono::Local::now()
            .format(ss2lib::record::TIMESTAMP_FORMAT)
            .to_string();

        let mut path = log_path(&self.logfile, input, &home, &now);
        if let Some(extension) = extension {
            path.set_extension(extension);
        }
        Ok(path)
    }
}

fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .filter(|h| !h.is_empty())
        .map(PathBuf::from)
}

/// Fill in a log path template.
pub fn log_path(template: &str, input: Option<&Path>, home: &Path, timestamp: &str) -> PathBuf {
    if template == DEFAULT_LOG {
        if let Some(input) = input {
            let stem = input.file_stem().unwrap_or_default().to_string_lossy();
            let dir = input.parent().unwrap_or(Path::new(""));
            return dir.join("ss2logs").join(format!("{}_parsed.json", stem));
        }
    }

    let filled = template.replace(HOME, &home.to_string_lossy());
    let mut path = PathBuf::from(filled);
    if template != DEFAULT_LOG && (path.extension().is_none() || path.is_dir()) {
        path.push(DEFAULT_NAME);
    }

    PathBuf::from(path.to_string_lossy().replace(TIMESTAMP, timestamp))
}

/// Create the parent directories of `path`.
pub fn create_parent(path: &Path) -> anyhow::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

/// Appends values to a file as indented JSON, one after another. The
/// file is only created once something is recorded.
#[derive(Debug)]
pub struct Recorder {
    path: PathBuf,
    file: Option<std::fs::File>,
    count: usize,
}

impl Recorder {
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            file: None,
            count: 0,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of values recorded so far.
    pub fn count(&self) -> usize {
        self.count
    }

    pub fn record<T>(&mut self, value: &T) -> anyhow::Result<()>
    where
        T: Serialize,
    {
        let file = match self.file.take() {
            Some(file) => file,
            None => {
                create_parent(&self.path)?;
                std::fs::File::options()
                    .create(true)
                    .append(true)
                    .open(&self.path)?
            }
        };
        let file = self.file.insert(file);

        file.write_all(&to_json(value)?)?;
        self.count += 1;
        Ok(())
    }
}

/// Four-space indented JSON, with a trailing newline.
pub fn to_json<T>(value: &T) -> anyhow::Result<Vec<u8>>
where
    T: Serialize,
{
    let mut out = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut out, formatter);
    value.serialize(&mut ser)?;
    out.push(b'\n');
    Ok(out)
}

#[cfg(test)]
mod test {
    use super::*;

    const NOW: &str = "2021-02-03_04-05-06";

    fn home() -> PathBuf {
        PathBuf::from("/home/gator")
    }

    #[test]
    fn default_path() {
        assert_eq!(
            log_path(DEFAULT_LOG, None, &home(), NOW),
            PathBuf::from("/home/gator/ss2logs/ss2beacon_parsed_2021-02-03_04-05-06.json")
        );
    }

    #[test]
    fn default_path_beside_input() {
        let input = Path::new("/data/pass/capture.kss");
        assert_eq!(
            log_path(DEFAULT_LOG, Some(input), &home(), NOW),
            PathBuf::from("/data/pass/ss2logs/capture_parsed.json")
        );
    }

    #[test]
    fn user_directory() {
        assert_eq!(
            log_path("[$HOME]/decoded", None, &home(), NOW),
            PathBuf::from("/home/gator/decoded/ss2beacon_parsed_2021-02-03_04-05-06.json")
        );
        // a user path is used even when reading a file
        let input = Path::new("/data/capture.log");
        assert_eq!(
            log_path("/tmp/out.json", Some(input), &home(), NOW),
            PathBuf::from("/tmp/out.json")
        );
    }

    #[test]
    fn user_timestamp() {
        assert_eq!(
            log_path("/logs/pass_[$TIMESTAMP].json", None, &home(), NOW),
            PathBuf::from("/logs/pass_2021-02-03_04-05-06.json")
        );
    }

    #[test]
    fn json_layout() {
        let mut record = std::collections::BTreeMap::new();
        record.insert("a", 1);
        let json = to_json(&record).unwrap();
        assert_eq!(std::str::from_utf8(&json).unwrap(), "{\n    \"a\": 1\n}\n");
    }

    #[test]
    fn recorder_appends() {
        let dir = std::env::temp_dir().join(format!("ss2tool-recorder-{}", std::process::id()));
        let path = dir.join("nested").join("out.json");
        let _ = std::fs::remove_dir_all(&dir);

        let mut recorder = Recorder::new(path.clone());
        assert!(!path.exists());
        recorder.record(&1).unwrap();
        recorder.record(&[2, 3]).unwrap();
        assert_eq!(recorder.count(), 2);

        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, "1\n[\n    2,\n    3\n]\n");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
