use std::io::Write;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use crate::client::TaskClient;
use crate::task::{sort_by_priority, NewTask, Priority, Status, Task, TaskId};

#[derive(Parser, Debug)]
#[command(name = "taskboard", version, about = "Terminal client for the task REST API")]
pub struct Args {
    /// Config file (defaults to ./taskboard.toml when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Server root URL, overrides config and environment
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Open the interactive board (default)
    Tui,
    /// List all tasks
    List {
        /// Show HIGH priority first
        #[arg(long)]
        by_priority: bool,
    },
    /// Show one task
    Show { id: TaskId },
    /// Create a task
    Add {
        title: String,
        #[arg(short, long, default_value = "")]
        description: String,
        #[arg(short, long, default_value = "medium")]
        priority: Priority,
    },
    /// Change a task's status
    Status { id: TaskId, status: Status },
    /// Delete a task
    Delete { id: TaskId },
}

/// Runs a non-interactive command. Unlike the board, failures propagate.
pub async fn run(command: Command, client: &TaskClient, out: &mut impl Write) -> anyhow::Result<()> {
    match command {
        Command::Tui => bail!("the interactive board is not a one-shot command"),
        Command::List { by_priority } => {
            let tasks = client.list().await.context("failed to load tasks")?;
            let mut rows: Vec<&Task> = tasks.iter().collect();
            if by_priority {
                sort_by_priority(&mut rows);
            }
            if rows.is_empty() {
                writeln!(out, "No tasks.")?;
            }
            for task in rows {
                writeln!(out, "{}", summary(task))?;
            }
        }
        Command::Show { id } => {
            let task = client
                .get(id)
                .await
                .with_context(|| format!("failed to load task {id}"))?;
            writeln!(out, "{}", summary(&task))?;
            if !task.description_text().is_empty() {
                writeln!(out, "    {}", task.description_text())?;
            }
            if let Some(deadline) = task.deadline {
                writeln!(out, "    due {}", deadline.format("%Y-%m-%d %H:%M"))?;
            }
        }
        Command::Add {
            title,
            description,
            priority,
        } => {
            if title.trim().is_empty() {
                bail!("title must not be empty");
            }
            let created = client
                .create(&NewTask {
                    title,
                    description,
                    priority,
                })
                .await
                .context("failed to create task")?;
            writeln!(out, "Created {}", summary(&created))?;
        }
        Command::Status { id, status } => {
            let task = client
                .get(id)
                .await
                .with_context(|| format!("failed to load task {id}"))?;
            let updated = client
                .update(&task.with_status(status))
                .await
                .with_context(|| format!("failed to update task {id}"))?;
            writeln!(out, "Updated {}", summary(&updated))?;
        }
        Command::Delete { id } => {
            client
                .delete(id)
                .await
                .with_context(|| format!("failed to delete task {id}"))?;
            writeln!(out, "Deleted task #{id}")?;
        }
    }
    Ok(())
}

fn summary(task: &Task) -> String {
    let id = task.id.map_or_else(|| "-".to_string(), |id| id.to_string());
    let overdue = if task.is_overdue() { " OVERDUE" } else { "" };
    format!(
        "[#{}] {} ({}, {}){}",
        id,
        task.title,
        task.priority,
        task.status.label(),
        overdue
    )
}
