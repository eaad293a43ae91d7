//! `syncd generate --source {beads|github|api}` (SPEC_FULL §6.3): renders
//! `.todo/*.md` files from an existing source via C4+C5+C6 -- the
//! beads→files axis (§4.7 item 1), run once and exited.

use std::fs;
use std::io::BufReader;

use beads_core::issue::Issue;
use beads_core::jsonl::read_jsonl;
use beads_query::DagView;
use beads_template::markdown::{self, YamlValue};
use beads_template::render::{render_outputs, RenderContext};
use beads_template::Pattern;
use beads_upstream::GitHubClient;

use crate::cli::{GenerateArgs, GenerateSource};
use crate::error::{CliError, Result};

pub async fn run(args: &GenerateArgs) -> Result<()> {
    let template_path = args.todo_dir.join("TODO.mdx");
    let template = fs::read_to_string(&template_path)
        .map_err(|e| CliError::Config(format!("reading {}: {e}", template_path.display())))?;
    let doc = markdown::parse(&template)?;

    let issues = match args.source {
        GenerateSource::Beads => load_from_beads_store()?,
        GenerateSource::Github => load_from_github(&doc).await?,
        GenerateSource::Api => load_from_api(&doc).await?,
    };

    let pattern_str = doc
        .frontmatter
        .get("filePattern")
        .and_then(YamlValue::as_str)
        .unwrap_or(beads_template::DEFAULT_PATTERN);
    let pattern = Pattern::compile(pattern_str)?;

    let dag = DagView::new(issues.clone(), Vec::new());
    let ctx = RenderContext { issues: &issues, dag: &dag, this: None };
    let outputs = render_outputs(&template, &ctx, &pattern)?;

    for output in &outputs {
        let path = args.todo_dir.join(&output.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &output.content)?;
    }

    tracing::info!(source = ?args.source, files = outputs.len(), "generated .todo files");
    Ok(())
}

fn load_from_beads_store() -> Result<Vec<Issue>> {
    let path = std::path::Path::new(".beads/issues.jsonl");
    if !path.exists() {
        return Ok(Vec::new());
    }
    let file = fs::File::open(path)?;
    read_jsonl(BufReader::new(file))
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(|e| CliError::Compile(e.to_string()))
}

async fn load_from_github(doc: &markdown::Document) -> Result<Vec<Issue>> {
    let owner = doc.frontmatter.get("owner").and_then(YamlValue::as_str).unwrap_or_default();
    let repo = doc.frontmatter.get("repo").and_then(YamlValue::as_str).unwrap_or_default();
    let token = std::env::var("GITHUB_TOKEN")
        .map_err(|_| CliError::Upstream("GITHUB_TOKEN is not set".into()))?;
    let client = GitHubClient::new(token, owner, repo).map_err(|e| CliError::Upstream(e.to_string()))?;
    beads_upstream::github::list_issues(&client, None)
        .await
        .map_err(|e| CliError::Upstream(e.to_string()))
}

async fn load_from_api(doc: &markdown::Document) -> Result<Vec<Issue>> {
    let api_url = doc
        .frontmatter
        .get("apiUrl")
        .and_then(YamlValue::as_str)
        .ok_or_else(|| CliError::Config("TODO.mdx is missing apiUrl for --source api".into()))?;
    let api_key = doc.frontmatter.get("apiKey").and_then(YamlValue::as_str);

    let client = reqwest::Client::new();
    let mut request = client.get(format!("{api_url}/issues"));
    if let Some(key) = api_key {
        request = request.bearer_auth(key);
    }
    let response = request.send().await.map_err(|e| CliError::Upstream(e.to_string()))?;
    response.json::<Vec<Issue>>().await.map_err(|e| CliError::Upstream(e.to_string()))
}
