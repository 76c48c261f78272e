fn main() {
    // The default logger writes next to the executable unless told otherwise.
    logtier::default_logger().set_log_dir("./logs");
    logtier::default_logger().set_log_name("default");

    logtier::debug(&[&"starting", &"worker", &1]);
    logtier::infof(format_args!("listening on {}", "127.0.0.1:8080"));
    logtier::warning!("queue depth {} above {}", 1200, 1000);
    logtier::error!("giving up after {} retries", 5);

    logtier::flush();
}
