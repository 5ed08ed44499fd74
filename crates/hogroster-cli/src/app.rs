//! Application state for the hogroster front end.
//!
//! `App` owns the roster, the current query and the row numbering of the last
//! rendered table. It turns commands into roster calls and tells the renderer
//! what to draw; it never decides a role rule itself.

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::{debug, info};

use hogroster_core::{
    Change, Config, Filter, HackedRoster, Query, RosterClient, RuleViolation, SortKey,
    StudentId, StudentRecord,
};

use crate::commands::Command;

/// Which role toggle a command asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Prefect,
    Squad,
    Expel,
}

impl Toggle {
    pub fn label(&self) -> &'static str {
        match self {
            Toggle::Prefect => "prefect",
            Toggle::Squad => "inquisitorial squad",
            Toggle::Expel => "expulsion",
        }
    }
}

/// What the renderer should show after a command.
#[derive(Debug)]
pub enum Response {
    Table,
    Detail(StudentId),
    Counts,
    History,
    Help,
    Message(String),
    Toggled {
        student: StudentId,
        toggle: Toggle,
        result: Result<Change, RuleViolation>,
    },
    Quit,
    Nothing,
}

pub struct App {
    pub roster: HackedRoster,
    pub query: Query,
    client: RosterClient,
    config: Config,
    changes: watch::Receiver<u64>,
    rows: Vec<StudentId>,
}

impl App {
    pub fn new(roster: HackedRoster, client: RosterClient, config: Config) -> Self {
        let changes = roster.subscribe();
        let mut app = Self {
            roster,
            query: Query::default(),
            client,
            config,
            changes,
            rows: Vec::new(),
        };
        app.refresh_rows();
        app
    }

    /// Students in the current view, in display order.
    pub fn view(&self) -> Vec<&StudentRecord> {
        self.query.view(&self.roster)
    }

    /// Recompute the view and remember its row numbering.
    pub fn refresh_rows(&mut self) {
        let rows: Vec<StudentId> = self.view().iter().map(|s| s.id).collect();
        self.rows = rows;
    }

    pub fn rows(&self) -> &[StudentId] {
        &self.rows
    }

    /// True once per roster change; the caller redraws the table.
    pub fn take_changed(&mut self) -> bool {
        match self.changes.has_changed() {
            Ok(true) => {
                self.changes.borrow_and_update();
                true
            }
            _ => false,
        }
    }

    /// Run time-based roster effects. Returns how many squad members were
    /// dropped.
    pub fn tick(&mut self, now: DateTime<Utc>) -> usize {
        self.roster.poll(now)
    }

    /// Resolve a 1-based row number from the last table, or a full name.
    pub fn target(&self, arg: &str) -> Option<StudentId> {
        if let Ok(row) = arg.trim().parse::<usize>() {
            return row.checked_sub(1).and_then(|i| self.rows.get(i)).copied();
        }
        self.roster.find_by_name(arg).map(|s| s.id)
    }

    pub async fn handle(&mut self, command: Command) -> Response {
        match command {
            Command::List => {
                self.refresh_rows();
                Response::Table
            }
            Command::Filter(key) => {
                self.query.filter = Filter::parse(&key);
                self.refresh_rows();
                Response::Table
            }
            Command::Sort(key) => match SortKey::parse(&key) {
                Some(key) => {
                    self.query.sort.toggle(key);
                    self.refresh_rows();
                    Response::Table
                }
                None => Response::Message(format!("Unknown sort key {:?}, order unchanged", key)),
            },
            Command::Search(keyword) => self.search(keyword),
            Command::Show(arg) => match self.target(&arg) {
                Some(id) => Response::Detail(id),
                None => not_found(&arg),
            },
            Command::Prefect(arg) => self.toggle(&arg, Toggle::Prefect),
            Command::Squad(arg) => self.toggle(&arg, Toggle::Squad),
            Command::Expel(arg) => self.toggle(&arg, Toggle::Expel),
            Command::Counts => Response::Counts,
            Command::History => Response::History,
            Command::Refresh => self.refresh_families().await,
            Command::Help => Response::Help,
            Command::Quit => Response::Quit,
            Command::Empty => Response::Nothing,
            Command::Unknown(line) => {
                debug!(input = %line, "Unknown command");
                Response::Message(format!("Unknown command: {} (try 'help')", line))
            }
        }
    }

    fn search(&mut self, keyword: String) -> Response {
        if self.roster.is_trigger(&keyword) {
            self.query.keyword.clear();
            return match self.roster.activate(Utc::now()) {
                Some(_) => Response::Message("Something is wrong with the roster...".to_string()),
                None => Response::Message("Nothing happens.".to_string()),
            };
        }

        self.query.keyword = keyword;
        self.refresh_rows();
        Response::Table
    }

    fn toggle(&mut self, arg: &str, toggle: Toggle) -> Response {
        let Some(student) = self.target(arg) else {
            return not_found(arg);
        };

        let result = match toggle {
            Toggle::Prefect => self.roster.toggle_prefect(student),
            Toggle::Squad => self.roster.toggle_squad_membership(student),
            Toggle::Expel => self.roster.toggle_expelled(student),
        };
        Response::Toggled {
            student,
            toggle,
            result,
        }
    }

    async fn refresh_families(&mut self) -> Response {
        let families = self.client.fetch_known_families(&self.config.families_url).await;
        let revoked = self.roster.replace_families(families);
        info!(revoked, "Families refreshed");
        Response::Message(format!(
            "Family lists refreshed; {} squad member(s) no longer eligible",
            revoked
        ))
    }
}

fn not_found(arg: &str) -> Response {
    Response::Message(format!("No student matches {:?}", arg))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hogroster_core::{KnownFamilies, RawStudent, ResultCode, RosterStore};

    fn raw(fullname: &str, house: &str, gender: &str) -> RawStudent {
        RawStudent {
            fullname: fullname.to_string(),
            house: house.to_string(),
            gender: Some(gender.to_string()),
        }
    }

    fn app() -> App {
        let students = vec![
            raw("Harry Potter", "Gryffindor", "boy"),
            raw("Ron Weasley", "Gryffindor", "boy"),
            raw("Draco Malfoy", "Slytherin", "boy"),
        ];
        let store = RosterStore::load(&students, KnownFamilies::new(["Malfoy"], ["Weasley"]));
        let config = Config::default();
        let roster = HackedRoster::new(store, config.hack.clone());
        App::new(roster, RosterClient::new().expect("client"), config)
    }

    #[tokio::test]
    async fn test_rows_follow_sort() {
        let mut app = app();
        assert_eq!(app.target("1"), Some(StudentId(0)));

        app.handle(Command::Sort("lastName".into())).await;
        // Malfoy, Potter, Weasley
        assert_eq!(app.target("1"), Some(StudentId(2)));
        assert_eq!(app.target("3"), Some(StudentId(1)));
        assert_eq!(app.target("0"), None);
        assert_eq!(app.target("4"), None);
        assert_eq!(app.target("ron weasley"), Some(StudentId(1)));
    }

    #[tokio::test]
    async fn test_toggle_reports_result_and_signals() {
        let mut app = app();
        assert!(!app.take_changed());

        match app.handle(Command::Prefect("1".into())).await {
            Response::Toggled { result, .. } => assert_eq!(ResultCode::from(&result), ResultCode::Applied),
            other => panic!("unexpected response: {:?}", other),
        }
        assert!(app.take_changed());
        assert!(!app.take_changed());

        match app.handle(Command::Prefect("2".into())).await {
            Response::Toggled { result, .. } => {
                assert_eq!(ResultCode::from(&result), ResultCode::SameGenderConflict)
            }
            other => panic!("unexpected response: {:?}", other),
        }
        assert!(!app.take_changed());
    }

    #[tokio::test]
    async fn test_trigger_keyword_activates_hack() {
        let mut app = app();
        let response = app.handle(Command::Search("1337".into())).await;
        assert!(matches!(response, Response::Message(_)));
        assert!(app.roster.is_active());
        assert!(app.query.keyword.is_empty());
        assert!(app.take_changed());

        let hacker = app.roster.hacker().expect("hacker injected");
        match app.handle(Command::Expel(app.roster.get(hacker).map(|s| s.full_name()).unwrap_or_default())).await {
            Response::Toggled { result, .. } => {
                assert_eq!(ResultCode::from(&result), ResultCode::PermissionDenied)
            }
            other => panic!("unexpected response: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_filter_and_search() {
        let mut app = app();
        app.handle(Command::Filter("slytherin".into())).await;
        assert_eq!(app.rows(), &[StudentId(2)]);

        app.handle(Command::Filter("*".into())).await;
        app.handle(Command::Search("weas".into())).await;
        assert_eq!(app.rows(), &[StudentId(1)]);

        app.handle(Command::Search(String::new())).await;
        assert_eq!(app.rows().len(), 3);
    }
}
