use std::io::{self, BufRead, IsTerminal, Write};

use crate::commands::common::{
    normalize_post_identifier, open_coordinator, resolve_post, short_id, GlobalOptions,
};
use crate::error::CliError;

pub async fn run_delete(
    id: &str,
    skip_confirm: bool,
    options: &GlobalOptions,
) -> Result<(), CliError> {
    let normalized_id = normalize_post_identifier(id)?;
    let coordinator = open_coordinator(options).await?;
    let post = resolve_post(&normalized_id, &coordinator.posts())?;

    // Scripts without a terminal are not prompted.
    if !skip_confirm && io::stdin().is_terminal() {
        let prompt = format!("Delete '{}' ({})? [y/N] ", post.title, short_id(&post));
        let confirmed = confirm(&prompt, io::stdin().lock(), &mut io::stderr())?;
        if !confirmed {
            eprintln!("Cancelled");
            return Ok(());
        }
    }

    coordinator.delete(&post.id).await?;
    println!("{}", post.id);
    Ok(())
}

/// Ask a yes/no question; anything but `y`/`yes` declines.
pub fn confirm(
    prompt: &str,
    mut input: impl BufRead,
    output: &mut impl Write,
) -> io::Result<bool> {
    write!(output, "{prompt}")?;
    output.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(
        answer.trim().to_ascii_lowercase().as_str(),
        "y" | "yes"
    ))
}
