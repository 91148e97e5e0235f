//! Monitor over [`ToolFile`]: one owner task holds the file-surgery core and
//! serializes every read-modify-write cycle; concurrent callers queue on the
//! command channel.

use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::{
    config::StoreConfig,
    error::{Result, ToolsmithError},
    store::{ToolFile, ToolFunction},
};

enum StoreCommand {
    Create {
        name: String,
        code: String,
        respond: oneshot::Sender<Result<ToolFunction>>,
    },
    Read {
        name: String,
        respond: oneshot::Sender<Result<ToolFunction>>,
    },
    List {
        respond: oneshot::Sender<Result<Vec<String>>>,
    },
    Update {
        name: String,
        code: String,
        respond: oneshot::Sender<Result<ToolFunction>>,
    },
    Delete {
        name: String,
        respond: oneshot::Sender<Result<()>>,
    },
}

/// Cloneable async handle to the function store.
#[derive(Clone)]
pub struct FunctionStore {
    commands: mpsc::Sender<StoreCommand>,
}

impl FunctionStore {
    /// Initialize the backing file and spawn the owner task. Must be called
    /// from within a tokio runtime.
    pub fn spawn(config: StoreConfig) -> Result<Self> {
        let mut file = ToolFile::new(&config)?;
        file.ensure_exists()?;
        info!(path = %config.tools_file.display(), "function store started");

        let (commands, mut queue) = mpsc::channel(config.queue_depth.max(1));
        tokio::spawn(async move {
            while let Some(command) = queue.recv().await {
                handle(&mut file, command);
            }
            debug!("function store task stopped");
        });

        Ok(Self { commands })
    }

    pub async fn create(&self, name: &str, code: &str) -> Result<ToolFunction> {
        let (respond, response) = oneshot::channel();
        self.roundtrip(
            StoreCommand::Create {
                name: name.to_string(),
                code: code.to_string(),
                respond,
            },
            response,
        )
        .await
    }

    pub async fn read(&self, name: &str) -> Result<ToolFunction> {
        let (respond, response) = oneshot::channel();
        self.roundtrip(
            StoreCommand::Read {
                name: name.to_string(),
                respond,
            },
            response,
        )
        .await
    }

    pub async fn list(&self) -> Result<Vec<String>> {
        let (respond, response) = oneshot::channel();
        self.roundtrip(StoreCommand::List { respond }, response).await
    }

    pub async fn update(&self, name: &str, code: &str) -> Result<ToolFunction> {
        let (respond, response) = oneshot::channel();
        self.roundtrip(
            StoreCommand::Update {
                name: name.to_string(),
                code: code.to_string(),
                respond,
            },
            response,
        )
        .await
    }

    pub async fn delete(&self, name: &str) -> Result<()> {
        let (respond, response) = oneshot::channel();
        self.roundtrip(
            StoreCommand::Delete {
                name: name.to_string(),
                respond,
            },
            response,
        )
        .await
    }

    async fn roundtrip<T>(
        &self,
        command: StoreCommand,
        response: oneshot::Receiver<Result<T>>,
    ) -> Result<T> {
        self.commands
            .send(command)
            .await
            .map_err(|_| store_stopped())?;
        response.await.map_err(|_| store_stopped())?
    }
}

fn handle(file: &mut ToolFile, command: StoreCommand) {
    match command {
        StoreCommand::Create {
            name,
            code,
            respond,
        } => {
            let result = file.create(&name, &code);
            if let Err(err) = &result {
                warn!(function_name = %name, error = %err, "create rejected");
            }
            let _ = respond.send(result);
        }
        StoreCommand::Read { name, respond } => {
            let _ = respond.send(file.read(&name));
        }
        StoreCommand::List { respond } => {
            let _ = respond.send(file.list());
        }
        StoreCommand::Update {
            name,
            code,
            respond,
        } => {
            let result = file.update(&name, &code);
            if let Err(err) = &result {
                warn!(function_name = %name, error = %err, "update rejected");
            }
            let _ = respond.send(result);
        }
        StoreCommand::Delete { name, respond } => {
            let result = file.delete(&name);
            if let Err(err) = &result {
                warn!(function_name = %name, error = %err, "delete rejected");
            }
            let _ = respond.send(result);
        }
    }
}

fn store_stopped() -> ToolsmithError {
    ToolsmithError::InvalidState("function store task is not running".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir) -> StoreConfig {
        StoreConfig {
            tools_file: dir.path().join("tool_functions.rs"),
            ..StoreConfig::default()
        }
    }

    #[tokio::test]
    async fn serves_basic_operations() {
        let dir = TempDir::new().unwrap();
        let store = FunctionStore::spawn(config(&dir)).unwrap();

        store
            .create("add", "fn add(a: i64, b: i64) -> i64 { a + b }")
            .await
            .unwrap();
        assert_eq!(store.list().await.unwrap(), vec!["add"]);
        assert!(store.read("add").await.unwrap().code.contains("a + b"));

        store.delete("add").await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_creates_are_all_applied() {
        let dir = TempDir::new().unwrap();
        let store = FunctionStore::spawn(config(&dir)).unwrap();

        let mut tasks = Vec::new();
        for index in 0..8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                let name = format!("tool_{index}");
                let code = format!("fn tool_{index}() -> usize {{ {index} }}");
                store.create(&name, &code).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        let mut names = store.list().await.unwrap();
        names.sort();
        let expected: Vec<String> = (0..8).map(|i| format!("tool_{i}")).collect();
        assert_eq!(names, expected);
    }

    #[tokio::test]
    async fn handle_survives_cloning() {
        let dir = TempDir::new().unwrap();
        let store = FunctionStore::spawn(config(&dir)).unwrap();
        let other = store.clone();
        drop(store);

        other
            .create("keep", "fn keep() {}")
            .await
            .unwrap();
        assert_eq!(other.list().await.unwrap(), vec!["keep"]);
    }
}
