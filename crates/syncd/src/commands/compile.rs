//! `syncd compile` (SPEC_FULL §6.3): folds `.todo/*.md` into the canonical
//! beads JSONL store -- the files→beads axis (§4.7 item 2), run once and
//! exited, with no Coordinator/HTTP surface involved.

use std::collections::HashMap;
use std::fs;
use std::io::BufReader;
use std::path::Path;

use beads_core::idgen::generate_hash_id;
use beads_core::issue::Issue;
use beads_core::jsonl::{read_jsonl, write_jsonl};
use beads_template::{issue_from_document, markdown};
use chrono::Utc;

use crate::cli::CompileArgs;
use crate::error::{CliError, Result};

pub fn run(args: &CompileArgs) -> Result<()> {
    let mut store: HashMap<String, Issue> = if args.store.exists() {
        let file = fs::File::open(&args.store)?;
        read_jsonl(BufReader::new(file))
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| CliError::Compile(e.to_string()))?
            .into_iter()
            .map(|issue| (issue.id.clone(), issue))
            .collect()
    } else {
        HashMap::new()
    };

    let mut compiled = 0usize;
    for entry in read_markdown_files(&args.todo_dir)? {
        let content = fs::read_to_string(&entry)?;
        let doc = markdown::parse(&content)?;
        let mut issue = issue_from_document(&doc);
        if issue.id.is_empty() {
            issue.id = generate_hash_id("bd", &issue.title, &issue.body, "compile", Utc::now(), 6, 0);
        }
        issue.updated_at = Utc::now();
        store.insert(issue.id.clone(), issue);
        compiled += 1;
    }

    if let Some(parent) = args.store.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut issues: Vec<Issue> = store.into_values().collect();
    issues.sort_by(|a, b| a.id.cmp(&b.id));
    let mut file = fs::File::create(&args.store)?;
    write_jsonl(&mut file, &issues).map_err(|e| CliError::Compile(e.to_string()))?;

    tracing::info!(compiled, total = issues.len(), store = %args.store.display(), "compiled .todo files into beads store");
    Ok(())
}

fn read_markdown_files(dir: &Path) -> Result<Vec<std::path::PathBuf>> {
    if !dir.exists() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) == Some("md") {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}
