use plumbsite_core::{resolve_identifier, resolve_record, AppConfig};
use plumbsite_fetch::DatasetClient;
use plumbsite_hydrate::dataset_urls;

/// Resolves `query` against the live datasets and prints the merged record.
///
/// # Errors
///
/// Returns an error if the identifier is missing, a fetch fails, or no
/// record matches.
pub(crate) async fn run_lookup(config: &AppConfig, query: &str) -> anyhow::Result<()> {
    let options = &config.hydration;
    let key = resolve_identifier(query, options.identifier_mode, options.identifier_param())?;
    let client = DatasetClient::new(config.request_timeout_secs, &config.user_agent)?;
    let urls = dataset_urls(options, &config.dataset_url, &config.photo_url);

    let datasets = client.fetch_datasets(&urls).await?;
    let record = resolve_record(datasets.directory.businesses, datasets.photos.as_ref(), &key)?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}
