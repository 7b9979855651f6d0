//! Loading the model selection menu from a JSON file.
//!
//! The file is a flat object of menu name to remote model path:
//!
//! ```json
//! { "Garden": "/data/nif/garden.nif", "Lobby": "/data/nif/lobby.nif" }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use rui_core::ModelMenu;
use tracing::debug;

#[derive(Debug, thiserror::Error)]
pub enum MenuError {
    #[error("cannot read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid model menu {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

pub fn parse(json: &str) -> Result<ModelMenu, serde_json::Error> {
    let entries: BTreeMap<String, String> = serde_json::from_str(json)?;
    for (name, path) in &entries {
        debug!("loaded model entry. name: '{name}' remote-path: '{path}'");
    }
    Ok(ModelMenu::new(entries))
}

pub fn load(path: &Path) -> Result<ModelMenu, MenuError> {
    let text = std::fs::read_to_string(path).map_err(|source| MenuError::Read {
        path: path.display().to_string(),
        source,
    })?;
    parse(&text).map_err(|source| MenuError::Parse {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn parses_name_to_path_object() {
        let menu = parse(r#"{"Garden": "/nif/garden.nif", "Lobby": "/nif/lobby.nif"}"#).unwrap();
        assert_eq!(menu.path("Garden"), Some("/nif/garden.nif"));
        assert_eq!(menu.names().collect::<Vec<_>>(), vec!["Garden", "Lobby"]);
    }

    #[test]
    fn rejects_non_string_paths() {
        assert!(parse(r#"{"Garden": 3}"#).is_err());
        assert!(parse("[]").is_err());
    }

    #[test]
    fn loads_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"Cube": "/remote/cube.nif"}}"#).unwrap();
        let menu = load(file.path()).unwrap();
        assert_eq!(menu.path("Cube"), Some("/remote/cube.nif"));
    }

    #[test]
    fn missing_file_is_read_error() {
        assert!(matches!(
            load(Path::new("/no/such/menu.json")),
            Err(MenuError::Read { .. })
        ));
    }
}
