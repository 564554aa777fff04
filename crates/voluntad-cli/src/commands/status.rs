use crate::common::open_store;

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let store = open_store()?;
    let snap = store.snapshot();

    println!("date:        {}", snap.summary.date);
    println!(
        "pacts:       {}/{} complete ({:.0}%)",
        snap.summary.completed_tasks,
        snap.summary.total_tasks,
        snap.summary.completion_rate * 100.0
    );
    println!("zap sent:    {}", snap.summary.zap_sent);
    println!("streak:      {}", snap.summary.streak);
    println!("integrity:   {}", snap.integrity_score);
    println!("threat:      {}", snap.threat_level);
    println!(
        "check time:  {:02}:{:02}",
        snap.scheduled_hour, snap.scheduled_minute
    );
    Ok(())
}
