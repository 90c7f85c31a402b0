//! The todo viewer: pure model, messages and update function.
use std::time::Duration;

use serde::Deserialize;
use tidal_core::time::{self, Millis};
use tidal_core::{perform, Cmd, Decoder, Schema, Sub};
use tidal_http::{get, send, HttpError};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Todo {
    pub user_id: u64,
    pub id: u64,
    pub title: String,
    pub completed: bool,
}

pub fn todo_decoder() -> Decoder<Todo> {
    Decoder::from_schema(Schema::object([
        ("userId", Schema::Integer),
        ("id", Schema::Integer),
        ("title", Schema::String),
        ("completed", Schema::Boolean),
    ]))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// Start (or restart) loading the todo.
    Fetch,
    TodoLoaded(Result<Todo, HttpError>),
    Tick(Millis),
    StartedAt(Millis),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Load {
    Idle,
    Loading { attempt: u32 },
    Loaded(Todo),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub url: String,
    pub timeout: Option<Duration>,
    pub tick_interval: Duration,
    pub max_ticks: u32,
    pub retries: u32,
}

#[derive(Debug, Clone)]
pub struct Model {
    pub settings: Settings,
    pub load: Load,
    pub ticks: u32,
    pub started_at: Option<Millis>,
}

impl Model {
    /// The program is finished once the todo settled and enough ticks elapsed.
    pub fn is_done(&self) -> bool {
        let settled = matches!(self.load, Load::Loaded(_) | Load::Failed(_));
        settled && self.ticks >= self.settings.max_ticks
    }
}

pub fn init(settings: Settings) -> (Model, Cmd<Msg>) {
    let model = Model {
        settings,
        load: Load::Idle,
        ticks: 0,
        started_at: None,
    };
    let cmd = Cmd::batch([
        perform(time::now(), Msg::StartedAt),
        Cmd::message(Msg::Fetch),
    ]);
    (model, cmd)
}

pub fn update(mut model: Model, msg: Msg) -> (Model, Cmd<Msg>) {
    let cmd = match msg {
        Msg::Fetch => {
            if matches!(model.load, Load::Loading { .. }) {
                return (model, Cmd::none());
            }
            model.load = Load::Loading { attempt: 1 };
            fetch(&model.settings)
        }
        Msg::TodoLoaded(Ok(todo)) => {
            model.load = Load::Loaded(todo);
            Cmd::none()
        }
        Msg::TodoLoaded(Err(err)) => match model.load {
            // Retry policy belongs to the caller: timeouts and network errors
            // get a fresh request, everything else is final.
            Load::Loading { attempt }
                if attempt <= model.settings.retries
                    && matches!(err, HttpError::Timeout | HttpError::NetworkError(_)) =>
            {
                model.load = Load::Loading {
                    attempt: attempt + 1,
                };
                fetch(&model.settings)
            }
            _ => {
                model.load = Load::Failed(describe_error(&err));
                Cmd::none()
            }
        },
        Msg::Tick(_) => {
            model.ticks = model.ticks.saturating_add(1);
            Cmd::none()
        }
        Msg::StartedAt(millis) => {
            model.started_at = Some(millis);
            Cmd::none()
        }
    };

    (model, cmd)
}

pub fn subscriptions(model: &Model) -> Sub<Msg> {
    if model.settings.max_ticks == 0 {
        return Sub::none();
    }
    time::every(model.settings.tick_interval, Msg::Tick)
}

/// Renders the model as terminal lines.
pub fn view(model: &Model) -> Vec<String> {
    let status = match &model.load {
        Load::Idle => "idle".to_string(),
        Load::Loading { attempt } => format!("loading {} (attempt {attempt})", model.settings.url),
        Load::Loaded(todo) => format!(
            "#{} [{}] {} (user {})",
            todo.id,
            if todo.completed { "x" } else { " " },
            todo.title,
            todo.user_id
        ),
        Load::Failed(reason) => format!("failed: {reason}"),
    };
    let mut lines = vec![status, format!("ticks: {}", model.ticks)];
    if let Some(started_at) = model.started_at {
        lines.push(format!("started at {started_at} ms"));
    }
    lines
}

fn fetch(settings: &Settings) -> Cmd<Msg> {
    let mut request = get(settings.url.clone(), todo_decoder());
    request.timeout = settings.timeout;
    send(request, Msg::TodoLoaded)
}

fn describe_error(err: &HttpError) -> String {
    match err {
        HttpError::BadUrl(url) => format!("no todo at {url}"),
        HttpError::Timeout => "the server took too long".to_string(),
        HttpError::NetworkError(message) => format!("network unavailable ({message})"),
        HttpError::BadStatus(response) => format!(
            "server answered {} {}",
            response.status.code, response.status.message
        ),
        HttpError::BadPayload(message, _) => format!("unexpected payload: {message}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> Settings {
        Settings {
            url: "http://localhost/todos/1".to_string(),
            timeout: Some(Duration::from_millis(500)),
            tick_interval: Duration::from_millis(100),
            max_ticks: 2,
            retries: 1,
        }
    }

    fn todo() -> Todo {
        Todo {
            user_id: 1,
            id: 1,
            title: "delectus aut autem".to_string(),
            completed: false,
        }
    }

    #[test]
    fn init_reads_clock_and_fetches() {
        let (model, cmd) = init(settings());
        assert_eq!(model.load, Load::Idle);
        assert_eq!(cmd.len(), 2);
    }

    #[test]
    fn fetch_is_ignored_while_loading() {
        let (model, _) = init(settings());
        let (model, cmd) = update(model, Msg::Fetch);
        assert_eq!(model.load, Load::Loading { attempt: 1 });
        assert_eq!(cmd.len(), 1);

        let (model, cmd) = update(model, Msg::Fetch);
        assert_eq!(model.load, Load::Loading { attempt: 1 });
        assert!(cmd.is_none());
    }

    #[test]
    fn loaded_todo_is_rendered() {
        let (model, _) = init(settings());
        let (model, _) = update(model, Msg::Fetch);
        let (model, cmd) = update(model, Msg::TodoLoaded(Ok(todo())));

        assert!(cmd.is_none());
        assert_eq!(
            view(&model),
            vec!["#1 [ ] delectus aut autem (user 1)", "ticks: 0"]
        );
    }

    #[test]
    fn timeout_is_retried_until_budget_is_spent() {
        let (model, _) = init(settings());
        let (model, _) = update(model, Msg::Fetch);

        let (model, cmd) = update(model, Msg::TodoLoaded(Err(HttpError::Timeout)));
        assert_eq!(model.load, Load::Loading { attempt: 2 });
        assert_eq!(cmd.len(), 1);

        let (model, cmd) = update(model, Msg::TodoLoaded(Err(HttpError::Timeout)));
        assert_eq!(
            model.load,
            Load::Failed("the server took too long".to_string())
        );
        assert!(cmd.is_none());
    }

    #[test]
    fn bad_url_is_final() {
        let (model, _) = init(settings());
        let (model, _) = update(model, Msg::Fetch);
        let (model, cmd) = update(
            model,
            Msg::TodoLoaded(Err(HttpError::BadUrl("http://localhost/404".to_string()))),
        );

        assert_eq!(
            model.load,
            Load::Failed("no todo at http://localhost/404".to_string())
        );
        assert!(cmd.is_none());
    }

    #[test]
    fn done_after_settling_and_enough_ticks() {
        let (model, _) = init(settings());
        let (model, _) = update(model, Msg::Fetch);
        let (model, _) = update(model, Msg::Tick(1));
        let (model, _) = update(model, Msg::TodoLoaded(Ok(todo())));
        assert!(!model.is_done());

        let (model, _) = update(model, Msg::Tick(2));
        assert!(model.is_done());
    }

    #[test]
    fn no_ticks_means_no_subscription() {
        let mut settings = settings();
        settings.max_ticks = 0;
        let (model, _) = init(settings);
        assert!(subscriptions(&model).is_none());

        let (model, _) = init(self::settings());
        assert_eq!(subscriptions(&model).len(), 1);
    }
}
