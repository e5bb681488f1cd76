//! Facade-level smoke tests: the re-exported API loads a manifest file and
//! exposes the pipeline.

use std::io::Write;
use tempfile::NamedTempFile;
use vasari::PipelineManifest;

const MANIFEST: &str = r#"
[pipeline]
name = "digest"
description = "Summarize a corpus"

[toc]
order = ["summary"]

[stages.summary]
prompt = "Summarize everything. Output ONLY valid JSON."

[stages.summary.schema]
required = ["headline", "points"]
"#;

#[test]
fn test_manifest_loads_from_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(MANIFEST.as_bytes()).unwrap();

    let manifest = PipelineManifest::from_file(file.path()).unwrap();
    assert_eq!(manifest.name(), "digest");
    assert_eq!(manifest.pipeline().stages().len(), 1);

    let required = manifest.pipeline().stages()[0].schema().required().clone();
    assert_eq!(required, vec!["headline", "points"]);
}

#[test]
fn test_missing_file_is_an_error() {
    assert!(PipelineManifest::from_file("/nonexistent/pipeline.toml").is_err());
}
