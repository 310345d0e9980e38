use clap::{Args, Subcommand};
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::app_system::AdminSystem;
use crate::domain::{User, UserDraft, UserPatch, UserStatus};

#[derive(Debug, Subcommand)]
pub(crate) enum UserCommand {
    /// List every user
    List,
    /// Show one user
    Show {
        id: String,
        /// Print the password instead of masking it
        #[arg(long)]
        show_password: bool,
    },
    /// Create a user
    Create(NewUserArgs),
    /// Change some fields of a user
    Update {
        id: String,
        #[command(flatten)]
        fields: UserFieldArgs,
    },
    /// Delete a user
    Delete { id: String },
}

#[derive(Debug, Args)]
pub(crate) struct NewUserArgs {
    #[arg(long)]
    first_name: String,
    #[arg(long)]
    last_name: String,
    #[arg(long)]
    username: String,
    #[arg(long)]
    email: String,
    #[arg(long, env = "ADMIN_USER_PASSWORD", hide_env_values = true)]
    password: String,
    #[arg(long, default_value = "")]
    phone: String,
    #[arg(long, default_value = "")]
    location: String,
    #[arg(long, default_value_t = UserStatus::Active)]
    status: UserStatus,
}

impl From<NewUserArgs> for UserDraft {
    fn from(args: NewUserArgs) -> Self {
        UserDraft {
            id: None,
            first_name: args.first_name,
            last_name: args.last_name,
            username: args.username,
            email: args.email,
            password: args.password,
            phone: args.phone,
            location: args.location,
            status: args.status,
        }
    }
}

#[derive(Debug, Args)]
pub(crate) struct UserFieldArgs {
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    #[arg(long)]
    username: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    password: Option<String>,
    #[arg(long)]
    phone: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    status: Option<UserStatus>,
}

impl From<UserFieldArgs> for UserPatch {
    fn from(args: UserFieldArgs) -> Self {
        UserPatch {
            first_name: args.first_name,
            last_name: args.last_name,
            username: args.username,
            email: args.email,
            password: args.password,
            phone: args.phone,
            location: args.location,
            status: args.status,
        }
    }
}

#[derive(Tabled)]
struct UserRow {
    #[tabled(rename = "ID")]
    id: String,
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Username")]
    username: String,
    #[tabled(rename = "Email")]
    email: String,
    #[tabled(rename = "Phone")]
    phone: String,
    #[tabled(rename = "Location")]
    location: String,
    #[tabled(rename = "Status")]
    status: UserStatus,
}

impl From<&User> for UserRow {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.full_name(),
            username: user.username.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            location: user.location.clone(),
            status: user.status,
        }
    }
}

#[derive(Tabled)]
struct Field {
    #[tabled(rename = "Field")]
    name: &'static str,
    #[tabled(rename = "Value")]
    value: String,
}

fn detail(user: &User, show_password: bool) -> Table {
    let password = if show_password {
        user.password.clone()
    } else {
        "*".repeat(user.password.chars().count().min(12))
    };
    let fields = [
        ("ID", user.id.clone()),
        ("First name", user.first_name.clone()),
        ("Last name", user.last_name.clone()),
        ("Username", user.username.clone()),
        ("Email", user.email.clone()),
        ("Password", password),
        ("Phone", user.phone.clone()),
        ("Location", user.location.clone()),
        ("Status", user.status.to_string()),
    ];
    let mut table = Table::new(fields.into_iter().map(|(name, value)| Field { name, value }));
    table.with(Style::rounded());
    table
}

pub(crate) async fn run(command: UserCommand, system: &AdminSystem) -> Result<(), String> {
    let users = &system.user_client;
    match command {
        UserCommand::List => {
            let list = users.list_users().await.map_err(|e| e.to_string())?;
            if list.is_empty() {
                println!("No users.");
                return Ok(());
            }
            let mut table = Table::new(list.iter().map(UserRow::from));
            table.with(Style::rounded());
            println!("{table}");
        }
        UserCommand::Show { id, show_password } => {
            let user = users
                .get_user(id.clone())
                .await
                .map_err(|e| e.to_string())?
                .ok_or_else(|| format!("User not found: {id}"))?;
            println!("{}", detail(&user, show_password));
        }
        UserCommand::Create(args) => {
            let user = users
                .create_user(args.into())
                .await
                .map_err(|e| e.to_string())?;
            println!("Created user {} ({})", user.id, user.full_name());
        }
        UserCommand::Update { id, fields } => {
            let patch = UserPatch::from(fields);
            if patch.is_empty() {
                return Err("Nothing to update; pass at least one field flag".to_string());
            }
            let user = users
                .update_user(id, patch)
                .await
                .map_err(|e| e.to_string())?;
            println!("Updated user {} ({})", user.id, user.full_name());
        }
        UserCommand::Delete { id } => {
            users.delete_user(id.clone()).await.map_err(|e| e.to_string())?;
            println!("Deleted user {id}");
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User {
            id: "120".into(),
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            username: "ada".into(),
            email: "ada@example.com".into(),
            password: "engine".into(),
            phone: String::new(),
            location: "London".into(),
            status: UserStatus::Inactive,
        }
    }

    #[test]
    fn password_is_masked_unless_requested() {
        let masked = detail(&user(), false).to_string();
        assert!(!masked.contains("engine"));
        assert!(masked.contains("******"));

        let shown = detail(&user(), true).to_string();
        assert!(shown.contains("engine"));
    }

    #[test]
    fn empty_update_flags_make_an_empty_patch() {
        let args = UserFieldArgs {
            first_name: None,
            last_name: None,
            username: None,
            email: None,
            password: None,
            phone: None,
            location: None,
            status: None,
        };
        assert!(UserPatch::from(args).is_empty());
    }

    #[test]
    fn rows_show_the_full_name() {
        let row = UserRow::from(&user());
        assert_eq!(row.name, "Ada Lovelace");
        assert_eq!(row.status, UserStatus::Inactive);
    }
}
