use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use aws_client::{AwsCredentials, KmsClient, S3Client};
use community_common::{
    AwsConfig, GithubConfig, GraphConfig, KmsSecrets, MeetupConfig, SecretResolver, SummaryConfig,
    TwitterConfig,
};
use community_graph::{migrate::migrate, GraphClient, GraphWriter, SummaryReader};
use community_jobs::github::{import_repositories, GithubImportOptions};
use community_jobs::links::{clean_links, hydrate_links, unshorten_links, HttpWeb};
use community_jobs::links::{hydrate::HYDRATE_BATCH, unshorten::UNSHORTEN_BATCH};
use community_jobs::meetup::{import_meetups, MeetupImportOptions};
use community_jobs::summary::{generate_summary, SummaryOptions};
use community_jobs::twitter::{import_tweets, TwitterImportOptions};
use github_client::GithubClient;
use meetup_client::MeetupClient;
use twitter_client::TwitterClient;

#[derive(Parser)]
#[command(name = "community-jobs", about = "Community activity graph batch jobs")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Import tweets matching TWITTER_SEARCH
    TwitterImport,
    /// Strip tracking parameters from link URLs
    LinksClean,
    /// Resolve shortened links to their targets
    LinksUnshorten,
    /// Scrape page titles for links
    LinksHydrate,
    /// Import repositories matching GITHUB_SEARCH
    GithubImport,
    /// Import Meetup groups and events for MEETUP_TOPIC
    MeetupImport,
    /// Render the weekly summary page and upload it to S3
    SummaryPage,
    /// Encrypt a value under a KMS key for use as an environment secret
    EncryptSecret {
        #[arg(long)]
        key_id: String,
        value: String,
    },
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("community=info".parse()?))
        .init();

    let cli = Cli::parse();
    let aws = AwsConfig::from_env();

    match cli.command {
        Command::TwitterImport => {
            let config = TwitterConfig::from_env()?;
            config.log_redacted();
            let secrets = KmsSecrets::from_env(&aws.region)?;
            let bearer = secrets
                .resolve("TWITTER_BEARER", &config.encrypted_bearer)
                .await?;
            // Rejects a blank credential before any graph work.
            let twitter = TwitterClient::new(&bearer)?;

            let client = connect(&config.graph, &secrets).await?;
            migrate(&client).await?;
            let writer = GraphWriter::new(client);

            let opts = TwitterImportOptions::new(config.search, config.catch_up);
            let stats = import_tweets(&twitter, &writer, &opts).await?;
            info!(
                requests = stats.requests,
                pages = stats.pages_merged,
                tweets = stats.tweets,
                "Twitter import complete"
            );
        }
        Command::LinksClean => {
            let writer = link_writer(&aws).await?;
            let updated = clean_links(&writer).await?;
            info!(updated, "Links cleaned");
        }
        Command::LinksUnshorten => {
            let writer = link_writer(&aws).await?;
            let updated = unshorten_links(&writer, &HttpWeb::new()?, UNSHORTEN_BATCH).await?;
            info!(updated, "Links unshortened");
        }
        Command::LinksHydrate => {
            let writer = link_writer(&aws).await?;
            let updated = hydrate_links(&writer, &HttpWeb::new()?, HYDRATE_BATCH).await?;
            info!(updated, "Links hydrated");
        }
        Command::GithubImport => {
            let config = GithubConfig::from_env()?;
            config.log_redacted();
            let secrets = KmsSecrets::from_env(&aws.region)?;
            let token = secrets
                .resolve("GITHUB_TOKEN", &config.encrypted_token)
                .await?;
            let github = GithubClient::new(&token)?;

            let client = connect(&config.graph, &secrets).await?;
            migrate(&client).await?;
            let writer = GraphWriter::new(client);

            let opts = GithubImportOptions {
                search: config.search,
                lookback_days: config.lookback_days,
            };
            let stats = import_repositories(&github, &writer, &opts, Utc::now()).await?;
            info!(
                pages = stats.pages,
                merges = stats.merges,
                repositories = stats.repositories,
                "GitHub import complete"
            );
        }
        Command::MeetupImport => {
            let config = MeetupConfig::from_env()?;
            config.log_redacted();
            let secrets = KmsSecrets::from_env(&aws.region)?;
            let key = secrets
                .resolve("MEETUP_API_KEY", &config.encrypted_key)
                .await?;
            let meetup = MeetupClient::new(&key)?;

            let client = connect(&config.graph, &secrets).await?;
            migrate(&client).await?;
            let writer = GraphWriter::new(client);

            let opts = MeetupImportOptions {
                topic: config.topic,
                lookback_days: config.lookback_days,
            };
            let stats = import_meetups(&meetup, &writer, &opts, Utc::now()).await?;
            info!(groups = stats.groups, events = stats.events, "Meetup import complete");
        }
        Command::SummaryPage => {
            let Some(config) = SummaryConfig::from_env()? else {
                info!("GENERATE_SUMMARY is off, nothing to do");
                return Ok(());
            };
            config.log_redacted();
            let secrets = KmsSecrets::from_env(&config.aws.region)?;
            let client = connect(&config.graph, &secrets).await?;
            let reader = SummaryReader::new(client);
            let s3 = S3Client::new(
                AwsCredentials::from_env()?,
                &config.aws.region,
                config.aws.s3_endpoint_url.clone(),
            );

            let opts = SummaryOptions::from_config(&config);
            let stats = generate_summary(&reader, &s3, &opts, Utc::now()).await?;
            info!(
                repositories = stats.repositories,
                links = stats.links,
                events = stats.events,
                "Summary page published"
            );
        }
        Command::EncryptSecret { key_id, value } => {
            let kms = KmsClient::new(AwsCredentials::from_env()?, &aws.region);
            let ciphertext = kms.encrypt(&key_id, &value).await?;
            println!("{ciphertext}");
        }
    }

    Ok(())
}

async fn connect(config: &GraphConfig, secrets: &impl SecretResolver) -> Result<GraphClient> {
    let password = secrets
        .resolve("graph password", &config.encrypted_password)
        .await?;
    let client = GraphClient::connect(&config.uri, &config.user, &password).await?;
    info!(uri = config.uri.as_str(), "Connected to graph");
    Ok(client)
}

/// Writer for the link passes; they only need the read-write graph settings.
async fn link_writer(aws: &AwsConfig) -> Result<GraphWriter> {
    let config = GraphConfig::from_env()?;
    config.log_redacted();
    let secrets = KmsSecrets::from_env(&aws.region)?;
    let client = connect(&config, &secrets).await?;
    Ok(GraphWriter::new(client))
}
