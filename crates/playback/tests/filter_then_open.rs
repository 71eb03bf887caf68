use std::sync::Arc;
use std::time::Duration;

use playback::{filter_links, RecordingLauncher, TabOpener};

#[tokio::test]
async fn model_text_without_links_opens_zero_tabs() {
    let launcher = Arc::new(RecordingLauncher::new());
    let opener = TabOpener::new(launcher.clone()).with_pacing(Duration::ZERO);

    let links = filter_links("Sorry, I cannot browse the web.\nTry searching for lo-fi beats.");
    let outcomes = opener.open_all(&links).await;

    assert!(links.is_empty());
    assert!(outcomes.is_empty());
    assert!(launcher.opened().is_empty());
}

#[tokio::test]
async fn only_filtered_links_reach_the_browser() {
    let launcher = Arc::new(RecordingLauncher::new());
    let opener = TabOpener::new(launcher.clone()).with_pacing(Duration::ZERO);
    let reply = "Here you go:\nhttps://www.youtube.com/watch?v=one\n- bonus track\nhttps://www.youtube.com/watch?v=two";

    let outcomes = opener.open_all(&filter_links(reply)).await;

    assert_eq!(outcomes.len(), 2);
    assert_eq!(
        launcher.opened(),
        vec![
            "https://www.youtube.com/watch?v=one".to_string(),
            "https://www.youtube.com/watch?v=two".to_string(),
        ]
    );
}
