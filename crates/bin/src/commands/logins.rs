//! Login commands - list, show, add, update and delete vault entries.

use feedvault::{Session, session::Mutation, vault::LoginEntry};

use crate::cli::EntryArgs;
use crate::output::{OutputFormat, describe_persist, login_json, print_table};

/// Run the list command
pub fn list(session: &Session, format: OutputFormat) -> Result<(), Box<dyn std::error::Error>> {
    let logins = session.logins();
    match format {
        OutputFormat::Human => {
            if logins.is_empty() {
                println!("No logins stored");
                return Ok(());
            }
            let rows: Vec<Vec<String>> = logins
                .iter()
                .map(|(id, entry)| vec![id.clone(), entry.name.clone(), entry.username.clone()])
                .collect();
            print_table(&["ID", "NAME", "USERNAME"], &rows);
        }
        OutputFormat::Json => {
            let values: Vec<_> = logins
                .iter()
                .map(|(id, entry)| login_json(id, entry, false))
                .collect();
            println!("{}", serde_json::to_string(&values)?);
        }
    }
    Ok(())
}

/// Run the show command
pub fn show(
    session: &Session,
    id: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let entry = session
        .get_login(id)
        .ok_or_else(|| format!("No login with id {id}"))?;
    match format {
        OutputFormat::Human => {
            println!("ID:        {id}");
            println!("Name:      {}", entry.name);
            println!("Username:  {}", entry.username);
            println!("Password:  {}", entry.password);
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(&login_json(id, &entry, true))?);
        }
    }
    Ok(())
}

/// Run the add command
pub async fn add(
    session: &Session,
    args: &EntryArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mutation = session.create_login(entry_from(args)).await?;
    let id = mutation.value.clone();
    report("Added", &id, mutation, format)
}

/// Run the update command
pub async fn update(
    session: &Session,
    id: &str,
    args: &EntryArgs,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mutation = session.update_login(id, entry_from(args)).await?;
    report("Updated", id, mutation, format)
}

/// Run the delete command
pub async fn delete(
    session: &Session,
    id: &str,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mutation = session.delete_login(id).await?;
    report("Deleted", id, mutation, format)
}

fn entry_from(args: &EntryArgs) -> LoginEntry {
    LoginEntry::new(&args.name, &args.login, &args.secret)
}

fn report<T>(
    action: &str,
    id: &str,
    mutation: Mutation<T>,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let status = describe_persist(&mutation.persisted);
    match format {
        OutputFormat::Human => println!("{action} login {id}: {status}"),
        OutputFormat::Json => {
            let value = serde_json::json!({
                "action": action.to_lowercase(),
                "id": id,
                "persisted": mutation.persisted.is_ok(),
                "status": status,
            });
            println!("{}", serde_json::to_string(&value)?);
        }
    }
    Ok(())
}
