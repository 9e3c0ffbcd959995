fn main() -> Result<(), eframe::Error> {
    env_logger::init();

    // Save dialogs are spawned onto this runtime
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => Some(runtime),
        Err(err) => {
            log::error!("failed to start async runtime, saving is disabled: {err}");
            None
        }
    };
    let _guard = runtime.as_ref().map(|rt| rt.enter());

    mindmap_tool::run_app()
}
