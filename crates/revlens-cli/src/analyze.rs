//! `revlens analyze`: the whole review workflow in one run.
//!
//! Drives the same [`SessionContext`] the server uses, so the credential gate
//! and artifact bookkeeping behave identically.

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Args;
use revlens_analysis::{
    generate_competitive_edge, generate_keywords_and_descriptions, generate_optimized_titles,
    generate_review_summary, ArtifactKind, Pipeline, SessionContext,
};
use revlens_core::{AppConfig, ProfileKind};
use revlens_docs::{export_docx, ScratchDir};
use revlens_llm::{ClientOptions, OpenAiClient};

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// CSV export of reviews for your product
    #[arg(long = "main", value_name = "CSV")]
    pub main_csv: PathBuf,

    /// CSV export of reviews for a competitor product
    #[arg(long = "competitor", value_name = "CSV")]
    pub competitor_csv: Option<PathBuf>,

    /// Directory for the generated Word documents
    #[arg(long, default_value = "revlens-output")]
    pub out: PathBuf,

    /// Generate keyword recommendations and product descriptions
    #[arg(long)]
    pub keywords: bool,

    /// Generate optimized titles and descriptions (implies --keywords)
    #[arg(long)]
    pub titles: bool,

    /// Generate a customer-facing review summary
    #[arg(long)]
    pub summary: bool,

    /// API key for the completion service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,
}

/// Run the analysis and write every generated artifact to `args.out`.
///
/// Returns the paths of the written documents, in artifact order.
///
/// # Errors
///
/// Fails on a missing credential, any conversion or completion failure, or
/// when the output directory cannot be written. Nothing is written if the
/// analysis itself fails.
pub(crate) async fn run_analyze(
    config: &AppConfig,
    args: &AnalyzeArgs,
) -> anyhow::Result<Vec<PathBuf>> {
    let api_key = args
        .api_key
        .clone()
        .or_else(|| config.openai_api_key.clone())
        .ok_or_else(|| {
            anyhow::anyhow!("an API key is required: pass --api-key or set OPENAI_API_KEY")
        })?;

    let mut session = SessionContext::new();
    session.save_credential(&api_key)?;
    session.enter_main()?;

    let scratch = ScratchDir::new(config.scratch_dir.clone());
    let pipeline = Pipeline::from_config(config)?;
    let client = OpenAiClient::new(session.require_main()?, &ClientOptions::from_config(config))?;

    analyze_profile(
        &mut session,
        &scratch,
        &pipeline,
        &client,
        ProfileKind::Main,
        &args.main_csv,
    )
    .await?;

    if let Some(csv) = &args.competitor_csv {
        analyze_profile(
            &mut session,
            &scratch,
            &pipeline,
            &client,
            ProfileKind::Competitor,
            csv,
        )
        .await?;
        if let Some(report) = session.report(ProfileKind::Competitor).cloned() {
            let insights = generate_competitive_edge(&client, &report).await?;
            session.set_competitive_edge(insights);
        }
    }

    if args.keywords || args.titles {
        let report = session.require_report(ProfileKind::Main)?.clone();
        let generated = generate_keywords_and_descriptions(&client, &report).await?;
        session.set_keywords_and_descriptions(&generated);
    }

    if args.titles {
        let context = session.artifacts().keywords_and_descriptions.clone();
        let titles = generate_optimized_titles(&client, &context).await?;
        session.set_optimized_titles(titles);
    }

    if args.summary {
        let report = session.require_report(ProfileKind::Main)?.clone();
        let summary = generate_review_summary(&client, &report).await?;
        session.set_review_summary(summary);
    }

    write_artifacts(&session, &args.out)
}

async fn analyze_profile(
    session: &mut SessionContext,
    scratch: &ScratchDir,
    pipeline: &Pipeline,
    client: &OpenAiClient,
    kind: ProfileKind,
    csv: &Path,
) -> anyhow::Result<()> {
    let scratch = scratch.clone();
    let source = csv.to_path_buf();
    let text = tokio::task::spawn_blocking(move || scratch.ingest_csv_file(kind, &source))
        .await
        .context("review conversion task panicked")?
        .with_context(|| format!("failed to convert {}", csv.display()))?;
    session.set_raw_text(kind, text);

    let report = pipeline
        .run(client, &kind.profile(), session.require_raw_text(kind)?)
        .await?;
    if report.is_empty() {
        tracing::warn!(profile = %kind, csv = %csv.display(), "no review text found");
    }
    session.store_report(kind, report);
    Ok(())
}

fn write_artifacts(session: &SessionContext, out: &Path) -> anyhow::Result<Vec<PathBuf>> {
    std::fs::create_dir_all(out)
        .with_context(|| format!("failed to create output directory {}", out.display()))?;

    let mut written = Vec::new();
    for kind in ArtifactKind::ALL {
        let Some(text) = session.artifact_text(kind) else {
            continue;
        };
        let path = out.join(kind.file_name());
        export_docx(text, &path)?;
        println!("== {} ==\n{text}\n", kind.file_stem().replace('_', " "));
        written.push(path);
    }
    Ok(written)
}
