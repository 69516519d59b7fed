//! Buffered KPI sink held in memory

use crate::core::ports::KpiEventSink;
use crate::domain::{KpiEvent, Result};
use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct SinkState {
    pending: Vec<KpiEvent>,
    flushed: Vec<KpiEvent>,
}

/// [`KpiEventSink`] that buffers events until [`KpiEventSink::flush`]
///
/// # Example
///
/// ```
/// use optimed::adapters::memory::InMemoryKpiSink;
/// use optimed::core::ports::KpiEventSink;
/// use optimed::domain::KpiEvent;
///
/// # async fn example() -> optimed::domain::Result<()> {
/// let sink = InMemoryKpiSink::new();
/// let event = KpiEvent::builder()
///     .metric("bed_idle_minutes")
///     .value(42.0)
///     .metric_source("bed-board")
///     .build()?;
/// sink.record(event).await?;
/// sink.flush().await?;
/// assert_eq!(sink.flushed().await.len(), 1);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Default)]
pub struct InMemoryKpiSink {
    state: Mutex<SinkState>,
}

impl InMemoryKpiSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events made visible by previous flushes, in record order
    pub async fn flushed(&self) -> Vec<KpiEvent> {
        self.state.lock().await.flushed.clone()
    }

    /// Number of events recorded since the last flush
    pub async fn pending(&self) -> usize {
        self.state.lock().await.pending.len()
    }
}

#[async_trait]
impl KpiEventSink for InMemoryKpiSink {
    async fn record(&self, event: KpiEvent) -> Result<()> {
        tracing::trace!(metric = event.metric(), value = event.value(), "KPI recorded");
        self.state.lock().await.pending.push(event);
        Ok(())
    }

    async fn flush(&self) -> Result<()> {
        let mut state = self.state.lock().await;
        let batch = std::mem::take(&mut state.pending);
        tracing::debug!(count = batch.len(), "Flushing KPI events");
        state.flushed.extend(batch);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(metric: &str, value: f64) -> KpiEvent {
        KpiEvent::builder()
            .metric(metric)
            .value(value)
            .metric_source("unit-test")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_record_buffers_until_flush() {
        let sink = InMemoryKpiSink::new();
        sink.record(event("a", 1.0)).await.unwrap();
        sink.record(event("b", 2.0)).await.unwrap();

        assert_eq!(sink.pending().await, 2);
        assert!(sink.flushed().await.is_empty());

        sink.flush().await.unwrap();
        assert_eq!(sink.pending().await, 0);

        let flushed = sink.flushed().await;
        assert_eq!(flushed.len(), 2);
        assert_eq!(flushed[0].metric(), "a");
        assert_eq!(flushed[1].metric(), "b");
    }

    #[tokio::test]
    async fn test_flush_empty_is_noop() {
        let sink = InMemoryKpiSink::new();
        sink.flush().await.unwrap();
        assert!(sink.flushed().await.is_empty());
    }
}
