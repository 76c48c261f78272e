use {
    logtier::{LoggerBuilder, RotationSize, Severity},
    std::time::Duration,
};

fn main() {
    let logger = LoggerBuilder::new("./logs", "rotation")
        .max_file_size(RotationSize::KB(4)) // Rotate at 4 KB
        .severity_limit(Severity::Info)
        .file_mode(0o640) // Set file permissions to: owner rw, group r, others none
        .flush_interval(Duration::from_secs(1))
        .build();

    // Simulate enough traffic to rotate the INFO file several times; the
    // WARNING and ERROR files grow much more slowly.
    for i in 1..=200 {
        logtier::info!(logger, "Log entry #{}: a sample message that will contribute to file size", i);
        if i % 25 == 0 {
            logtier::warning!(logger, "Entry #{} took longer than expected", i);
        }
        if i % 100 == 0 {
            logger.error(&[&"Entry", &i, &"failed"]);
        }
    }

    for (severity, path) in Severity::ALL.iter().zip(logger.sink_paths()) {
        match path {
            Some(path) => println!("{severity}: {}", path.display()),
            None => println!("{severity}: not recorded"),
        }
    }
}
