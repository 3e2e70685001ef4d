use crate::model::ModelSource;
use anyhow::Context;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct FileModelSource {
    path: PathBuf,
}

impl FileModelSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait::async_trait]
impl ModelSource for FileModelSource {
    fn describe(&self) -> String {
        format!("file {}", self.path.display())
    }

    async fn fetch_bytes(&self) -> anyhow::Result<Vec<u8>> {
        tokio::fs::read(&self.path)
            .await
            .with_context(|| format!("failed to read model file {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::load_model;
    use std::io::Write;

    #[tokio::test]
    async fn loads_model_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"k":2,"features":["a","b","c","d","e"],"centroids":[[1,0,0,0,0],[0,1,0,0,0]],"means":[0,0,0,0,0],"stds":[1,1,1,1,0],"avg_target_deltas":[3.5,-1.0]}}"#
        )
        .unwrap();

        let source = FileModelSource::new(file.path());
        let model = load_model(&source).await.unwrap();
        assert_eq!(model.k(), 2);
        assert_eq!(model.stds()[4], 0.0);
    }

    #[tokio::test]
    async fn missing_file_is_reported_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.json");
        let err = FileModelSource::new(&path).fetch_bytes().await.unwrap_err();
        assert!(format!("{err:#}").contains("absent.json"));
    }
}
