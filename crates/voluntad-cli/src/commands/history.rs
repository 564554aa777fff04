use crate::common::open_store;

pub fn run(limit: Option<usize>) -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let history = store.snapshot().history;
    let shown = match limit {
        Some(n) => &history[history.len().saturating_sub(n)..],
        None => &history[..],
    };
    println!("{}", serde_json::to_string_pretty(shown)?);
    Ok(())
}
