use crate::codec;
use crate::config::SearchConfig;

pub fn state_command(reset: bool) -> anyhow::Result<()> {
    if reset {
        let mut config = SearchConfig::try_load()?;
        config.last_query = None;
        config.save()?;
        println!("✓ Remembered search cleared");
        return Ok(());
    }

    let config = SearchConfig::load()?;

    if !config.persist_state {
        println!("Search state persistence is off ({}).", SearchConfig::config_path()?.display());
    }
    match &config.last_query {
        None => println!("No remembered search yet."),
        Some(query) => {
            let params = codec::from_query_string(query);
            println!("Remembered search: {}", query);
            println!("  q:        {}", params.q);
            println!("  language: {}", params.lang.label());
            println!("  sort:     {} ({})", params.sort, params.order);
            println!("  page:     {} ({} per page)", params.page, params.per_page);
        }
    }
    Ok(())
}
