pub mod board;
pub mod debt;
pub mod init;
pub mod sync;
pub mod task;

use chrono::{Local, NaiveDate};
use sprint_core::{config::Config, document::Document};
use std::path::{Path, PathBuf};

/// Config plus resolved paths for one invocation.
pub struct Project {
    pub root: PathBuf,
    pub config: Config,
}

impl Project {
    pub fn open(root: &Path) -> anyhow::Result<Self> {
        let config = Config::load_or_default(root)?;
        Ok(Self {
            root: root.to_path_buf(),
            config,
        })
    }

    pub fn data_path(&self) -> PathBuf {
        self.config.data_path(&self.root)
    }

    pub fn load(&self) -> anyhow::Result<Document> {
        Ok(Document::load(&self.data_path())?)
    }

    pub fn save(&self, doc: &mut Document) -> anyhow::Result<()> {
        let path = self.data_path();
        doc.save(&path)?;
        tracing::debug!(path = %path.display(), "saved sprint data");
        Ok(())
    }

    pub fn columns(&self) -> Vec<String> {
        self.config.columns()
    }
}

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}
