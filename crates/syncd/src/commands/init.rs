//! `syncd init` (SPEC_FULL §6.3): scaffolds `.beads/` and `.todo/` in a repo.
//! Deliberately minimal per §1's out-of-scope note on interactive scaffolding
//! -- this writes the empty store and a default template, nothing more.

use std::fs;

use crate::cli::InitArgs;
use crate::error::Result;

const DEFAULT_TEMPLATE: &str = "---\ntitle: TODO\noutputs: [\"TODO.md\", \"issues/*.md\"]\n---\n\n# {title}\n\n<Stats/>\n\n## Ready\n\n<Issues.Ready limit={10}/>\n\n## Blocked\n\n<Issues.Blocked/>\n";

pub fn run(args: &InitArgs) -> Result<()> {
    let beads_dir = args.path.join(".beads");
    let todo_dir = args.path.join(".todo");
    fs::create_dir_all(&beads_dir)?;
    fs::create_dir_all(&todo_dir)?;

    let store = beads_dir.join("issues.jsonl");
    if !store.exists() {
        fs::write(&store, "")?;
    }

    let template = todo_dir.join("TODO.mdx");
    if !template.exists() {
        fs::write(&template, DEFAULT_TEMPLATE)?;
    }

    tracing::info!(path = %args.path.display(), "initialized .beads/.todo layout");
    Ok(())
}
