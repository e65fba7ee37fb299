//! cms-migrate - moves a legacy CMS export into the new CMS.
//!
//! Expected data directory layout:
//!
//! ```text
//! old/
//!   Page.json              pages
//!   Page_translations.json translations
//!   languages.json         languages
//!   files/                 attachments (UUID_splitme_name.ext)
//! ```
//!
//! Attachments are uploaded to `/assets/<asset-prefix>/` and content URLs such
//! as `../../cms/assets/UUID?...` become `$assets$/<asset-prefix>/UUID.ext`.

use anyhow::Result;
use clap::Parser;
use cms_migrate_core::{
    run_migration, CmsApiConfig, Credentials, ExportConfig, MigrationSettings,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "cms-migrate")]
#[command(about = "Migrate a legacy CMS export, including assets, into the new CMS")]
#[command(version)]
struct Args {
    /// API user
    #[arg(short, long, default_value = CmsApiConfig::DEFAULT_USER)]
    user: String,

    /// API password
    #[arg(short, long, env = "CMS_MIGRATE_PASSWORD", hide_env_values = true)]
    password: String,

    /// Base URL of the application hosting the CMS API
    #[arg(short, long, default_value = CmsApiConfig::DEFAULT_BASE_URL)]
    base_url: String,

    /// Directory with the legacy export
    #[arg(short, long, default_value = ExportConfig::DEFAULT_DATA_DIR)]
    data_dir: PathBuf,

    /// Only simulate; log every change instead of sending it
    #[arg(long)]
    dry_run: bool,

    /// Enable debug logging
    #[arg(long)]
    verbose: bool,

    /// Don't migrate attachments or rewrite asset URLs
    #[arg(long)]
    skip_assets: bool,

    /// Asset folder on the target
    #[arg(long, default_value = CmsApiConfig::DEFAULT_ASSET_PREFIX)]
    asset_prefix: String,

    /// Prefix prepended to every legacy slug
    #[arg(long, default_value = CmsApiConfig::DEFAULT_SLUG_PREFIX)]
    slug_prefix: String,

    /// Where to write the old -> new page id mapping (default: <data-dir>/id_mapping.json)
    #[arg(long)]
    mapping_file: Option<PathBuf>,
}

impl Args {
    fn settings(&self) -> MigrationSettings {
        let mut settings = MigrationSettings::new(
            self.base_url.clone(),
            Credentials::new(self.user.clone(), self.password.clone()),
            self.data_dir.clone(),
        )
        .with_dry_run(self.dry_run)
        .with_skip_assets(self.skip_assets)
        .with_asset_prefix(self.asset_prefix.clone())
        .with_slug_prefix(self.slug_prefix.clone());

        if let Some(path) = &self.mapping_file {
            settings = settings.with_mapping_file(path.clone());
        }
        settings
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .init();

    match run(&args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            error!("Migration aborted: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<bool> {
    let summary = run_migration(&args.settings()).await?;

    // The mapping goes to stdout so it can be piped; everything else is logged.
    println!("{}", serde_json::to_string_pretty(&summary.id_mapping)?);

    Ok(summary.is_success())
}
