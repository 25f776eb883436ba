use lumen_browser::{
    evaluate_as, BrowserLauncher, ChromiumLauncher, ElementTarget, FrameTarget, RequestFilter,
};
use lumen_core::BrowserConfig;
use std::sync::Arc;
use std::time::Duration;

const PAGE: &str = "data:text/html,<html><body style='margin:0'>\
<div id='box' style='width:120px;height:60px;margin-top:2000px'>box</div>\
<button id='ok' onclick=\"this.dataset.clicked='1'\">OK</button></body></html>";

struct BlockEverything;

impl RequestFilter for BlockEverything {
    fn should_block(&self, url: &str) -> bool {
        url.starts_with("http")
    }
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_browser_launch_and_close() {
    let launcher = ChromiumLauncher::new(BrowserConfig::default());
    let browser = launcher.launch().await.expect("launch browser");
    let page = browser.new_page().await.expect("new page");
    page.close().await.expect("close page");
    browser.close().await.expect("close browser");
}

#[tokio::test]
#[ignore] // Requires Chrome/Chromium installed
async fn test_navigation_scroll_and_geometry() {
    let launcher = ChromiumLauncher::new(BrowserConfig::default());
    let browser = launcher.launch().await.expect("launch browser");
    let page = browser.new_page().await.expect("new page");
    page.set_request_filter(Arc::new(BlockEverything))
        .await
        .expect("install filter");

    page.navigate(PAGE, Duration::from_secs(10))
        .await
        .expect("navigate");

    let metrics = page.scroll_metrics().await.expect("metrics");
    assert!(metrics.scroll_height > 2000.0);
    assert_eq!(metrics.viewport_height, 900.0);

    let rect = page
        .element_rect(&ElementTarget::selector("#box"))
        .await
        .expect("rect")
        .expect("element found");
    assert_eq!(rect.width, 120.0);
    assert!(page
        .element_rect(&ElementTarget::selector("#missing"))
        .await
        .expect("rect")
        .is_none());

    let clicked = page
        .click_first_visible(&FrameTarget::Main, &["#nope", "#ok"], Duration::from_millis(300))
        .await
        .expect("click");
    assert_eq!(clicked.as_deref(), Some("#ok"));
    let flag: String = evaluate_as(
        page.as_ref(),
        &FrameTarget::Main,
        "document.getElementById('ok').dataset.clicked || ''",
    )
    .await
    .expect("evaluate");
    assert_eq!(flag, "1");

    let png = page.screenshot_full_page().await.expect("screenshot");
    assert_eq!(&png[..4], &[0x89, b'P', b'N', b'G']);

    page.close().await.expect("close page");
    browser.close().await.expect("close browser");
}
