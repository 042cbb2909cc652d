use anyhow::Context;
use serde::{Deserialize, Serialize};
use spectracore::i18n::DEFAULT_LANGUAGE;
use spectracore::LayoutConfig;
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub data: PathBuf,
    pub i18n_dir: PathBuf,
    pub language: String,
    pub output_dir: PathBuf,
    pub bind: SocketAddr,
    pub layout: LayoutConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            data: PathBuf::from("data.json"),
            i18n_dir: PathBuf::from("i18n"),
            language: DEFAULT_LANGUAGE.to_string(),
            output_dir: PathBuf::from("out"),
            bind: SocketAddr::from(([127, 0, 0, 1], 9000)),
            layout: LayoutConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading viewer config {}", path_ref.display()))?;
        let config: ViewerConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing viewer config {}", path_ref.display()))?;
        Ok(config)
    }

    /// Command-line values override whatever the file (or the defaults) said.
    pub fn with_overrides(
        mut self,
        data: Option<PathBuf>,
        i18n_dir: Option<PathBuf>,
        language: Option<String>,
    ) -> Self {
        if let Some(data) = data {
            self.data = data;
        }
        if let Some(dir) = i18n_dir {
            self.i18n_dir = dir;
        }
        if let Some(language) = language {
            self.language = language;
        }
        self
    }

    pub fn localization_path(&self, language: &str) -> PathBuf {
        self.i18n_dir.join(format!("{language}.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn overrides_replace_defaults() {
        let cfg = ViewerConfig::default().with_overrides(
            Some(PathBuf::from("other.json")),
            None,
            Some("ja".into()),
        );
        assert_eq!(cfg.data, PathBuf::from("other.json"));
        assert_eq!(cfg.language, "ja");
        assert_eq!(cfg.localization_path("ja"), PathBuf::from("i18n").join("ja.json"));
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"data: machines.json\nlanguage: en\nbind: 0.0.0.0:8080\nlayout:\n  height: 600\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = ViewerConfig::load(&path).unwrap();
        assert_eq!(cfg.data, PathBuf::from("machines.json"));
        assert_eq!(cfg.language, "en");
        assert_eq!(cfg.bind.port(), 8080);
        assert_eq!(cfg.layout.height, 600.0);
        assert_eq!(cfg.layout.width, 250.0);
        assert_eq!(cfg.i18n_dir, PathBuf::from("i18n"));
    }
}
