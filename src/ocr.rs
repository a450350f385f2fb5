use serde::Serialize;
use std::time::Duration;

/// Values the receipt scanner fills into the expense form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OcrFill {
    pub amount: &'static str,
    pub category: &'static str,
    pub description: &'static str,
    pub message: &'static str,
}

const CANNED_FILL: OcrFill = OcrFill {
    amount: "125.50",
    category: "meals",
    description: "Restaurant receipt — client meeting",
    message: "Receipt processed! Fields auto-filled via OCR.",
};

/// Simulated receipt recognition. There is no OCR engine: after `delay` the
/// same fill comes back whatever the file holds.
pub async fn scan_receipt(receipt: &[u8], delay: Duration) -> OcrFill {
    log::debug!("Scanning receipt of {} bytes", receipt.len());
    tokio::time::sleep(delay).await;
    CANNED_FILL
}
