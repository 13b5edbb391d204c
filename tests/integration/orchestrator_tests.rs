use super::*;
use std::sync::Arc;
use std::time::Instant;
use stock_watcher::{CheckTarget, PollOrchestrator};
use tokio::sync::watch;

async fn run_for(
    renderer: Arc<StubRenderer>,
    notifier: Arc<RecordingNotifier>,
    minutes: u64,
) -> anyhow::Result<()> {
    let orchestrator = Arc::new(PollOrchestrator::new(
        Arc::new(CheckTarget::default()),
        renderer,
        notifier,
        CHAT_ID,
        scheduler_config(),
        &scraper_config(),
    )?);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let handle = tokio::spawn({
        let orchestrator = orchestrator.clone();
        async move { orchestrator.run(shutdown_rx).await }
    });

    tokio::time::sleep(Duration::from_secs(minutes * 60)).await;
    shutdown_tx.send(true)?;
    handle.await?;
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_render_timeout_does_not_stop_the_loop() -> anyhow::Result<()> {
    let renderer = Arc::new(StubRenderer::new(Page::NeverLoads));
    let notifier = Arc::new(RecordingNotifier::default());

    run_for(renderer.clone(), notifier.clone(), 31).await?;

    // Immediate check plus the 30 minute tick, both timed out.
    assert_eq!(renderer.calls(), 2);

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].starts_with("Started monitoring"));
    assert!(messages.iter().all(|m| !m.contains("AVAILABLE")));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_every_available_tick_notifies_again() -> anyhow::Result<()> {
    let renderer = Arc::new(StubRenderer::new(Page::Ready(sale_section(&[(
        ITEM,
        "Add to Cart",
    )]))));
    let notifier = Arc::new(RecordingNotifier::default());

    run_for(renderer.clone(), notifier.clone(), 61).await?;

    assert_eq!(renderer.calls(), 3);
    let messages = notifier.messages();
    assert_eq!(messages.len(), 4);
    assert!(messages[0].starts_with("Started monitoring"));
    assert!(messages[1..].iter().all(|m| m.contains(ITEM) && m.contains(PAGE_URL)));
    assert!(notifier.recipients().iter().all(|to| to == CHAT_ID));
    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_missing_item_only_logs() -> anyhow::Result<()> {
    let renderer = Arc::new(StubRenderer::new(Page::Ready(sale_section(&[]))));
    let notifier = Arc::new(RecordingNotifier::default());

    run_for(renderer.clone(), notifier.clone(), 1).await?;

    assert_eq!(renderer.calls(), 1);
    assert_eq!(notifier.messages().len(), 1);
    Ok(())
}

#[test]
fn test_shutdown_stops_an_in_flight_blocking_render() -> anyhow::Result<()> {
    let runtime = tokio::runtime::Runtime::new()?;
    let renderer = Arc::new(BlockingRenderer::new(Duration::from_secs(8)));
    let notifier = Arc::new(RecordingNotifier::default());
    let start = Instant::now();

    runtime.block_on({
        let renderer = renderer.clone();
        let notifier = notifier.clone();
        async move {
            let orchestrator = PollOrchestrator::new(
                Arc::new(CheckTarget::default()),
                renderer,
                notifier,
                CHAT_ID,
                scheduler_config(),
                &scraper_config(),
            )?;

            let (shutdown_tx, shutdown_rx) = watch::channel(false);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(200)).await;
                let _ = shutdown_tx.send(true);
            });
            orchestrator.run(shutdown_rx).await;
            anyhow::Ok(())
        }
    })?;
    // Dropping the runtime waits for blocking threads still running.
    drop(runtime);

    assert!(start.elapsed() < Duration::from_secs(3));
    assert_eq!(renderer.abandoned(), 1);
    assert_eq!(notifier.messages().len(), 1);
    Ok(())
}
