//! Reconciler
//!
//! Runs one mutation through the optimistic round trip:
//! speculative patch, remote call, unconditional refetch, replace.

use std::future::Future;

use async_trait::async_trait;
use log::{debug, warn};
use tokio::sync::Mutex;

use crate::action::{Keyed, ListAction};
use crate::list::{Busy, OptimisticList, Phase};

/// Authoritative list fetch used to resolve speculative state
#[async_trait]
pub trait ListSource<T>: Send + Sync {
    type Error: Send;

    async fn fetch(&self) -> Result<Vec<T>, Self::Error>;
}

/// Outcome of one dispatched mutation
#[derive(Debug)]
pub struct Dispatched<O, E, F> {
    /// What the remote mutation returned
    pub mutation: Result<O, E>,
    /// Whether the follow-up refetch landed
    pub refetch: Result<(), F>,
}

impl<O, E, F> Dispatched<O, E, F> {
    pub fn succeeded(&self) -> bool {
        self.mutation.is_ok() && self.refetch.is_ok()
    }
}

/// One list, one source, at most one mutation in flight
pub struct Reconciler<T: Keyed, S> {
    state: Mutex<OptimisticList<T>>,
    source: S,
}

impl<T, S> Reconciler<T, S>
where
    T: Keyed + Send,
    S: ListSource<T>,
{
    pub fn new(source: S) -> Self {
        Self {
            state: Mutex::new(OptimisticList::default()),
            source,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub async fn view(&self) -> Vec<T> {
        self.state.lock().await.view()
    }

    pub async fn phase(&self) -> Phase {
        self.state.lock().await.phase()
    }

    pub async fn is_pending(&self) -> bool {
        self.state.lock().await.is_pending()
    }

    /// Load the authoritative list.
    ///
    /// The result is dropped if a mutation began or any snapshot landed while
    /// the fetch was in flight; the newer state wins.
    pub async fn refresh(&self) -> Result<(), S::Error> {
        let generation = self.state.lock().await.generation();
        let list = self.source.fetch().await?;
        if !self.state.lock().await.resolve_if_current(generation, list) {
            debug!("refresh overtaken by a newer list state, dropped");
        }
        Ok(())
    }

    /// Show `action` immediately, run `mutation`, then refetch whatever it returned.
    ///
    /// `mutation` is not polled until the patch is visible.
    pub async fn dispatch<Fut, O, E>(
        &self,
        action: ListAction<T>,
        mutation: Fut,
    ) -> Result<Dispatched<O, E, S::Error>, Busy>
    where
        Fut: Future<Output = Result<O, E>>,
    {
        self.state.lock().await.begin(action)?;

        let mutation = mutation.await;
        self.state.lock().await.settle();

        let refetch = match self.source.fetch().await {
            Ok(list) => {
                self.state.lock().await.resolve(list);
                Ok(())
            }
            Err(err) => {
                warn!("refetch after mutation failed, keeping last confirmed list");
                self.state.lock().await.abandon();
                Err(err)
            }
        };

        Ok(Dispatched { mutation, refetch })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex as StdMutex};
    use tokio::sync::oneshot;

    #[derive(Debug, Clone, PartialEq)]
    struct Todo {
        id: String,
        title: String,
    }

    impl Keyed for Todo {
        type Key = String;

        fn key(&self) -> String {
            self.id.clone()
        }
    }

    fn todo(id: &str, title: &str) -> Todo {
        Todo { id: id.to_string(), title: title.to_string() }
    }

    /// Server list the tests can edit behind the reconciler's back
    #[derive(Clone, Default)]
    struct FakeServer {
        rows: Arc<StdMutex<Vec<Todo>>>,
        offline: Arc<StdMutex<bool>>,
    }

    impl FakeServer {
        fn set(&self, rows: Vec<Todo>) {
            *self.rows.lock().unwrap() = rows;
        }

        fn go_offline(&self) {
            *self.offline.lock().unwrap() = true;
        }
    }

    #[async_trait]
    impl ListSource<Todo> for FakeServer {
        type Error = &'static str;

        async fn fetch(&self) -> Result<Vec<Todo>, Self::Error> {
            if *self.offline.lock().unwrap() {
                return Err("offline");
            }
            Ok(self.rows.lock().unwrap().clone())
        }
    }

    /// Snapshots the rows on its first fetch, then holds them until released
    struct GatedServer {
        server: FakeServer,
        gate: StdMutex<Option<oneshot::Receiver<()>>>,
    }

    #[async_trait]
    impl ListSource<Todo> for GatedServer {
        type Error = &'static str;

        async fn fetch(&self) -> Result<Vec<Todo>, Self::Error> {
            let gate = self.gate.lock().unwrap().take();
            let rows = self.server.fetch().await?;
            if let Some(gate) = gate {
                let _ = gate.await;
            }
            Ok(rows)
        }
    }

    #[tokio::test]
    async fn test_failed_add_reverts_after_refetch() {
        let server = FakeServer::default();
        let reconciler = Reconciler::new(server.clone());

        let (release, hold) = oneshot::channel::<()>();
        let dispatch = reconciler.dispatch(
            ListAction::Add { item: todo("1", "Buy milk") },
            async move {
                let _ = hold.await;
                Err::<(), _>("insert rejected")
            },
        );
        let observe = async {
            tokio::task::yield_now().await;
            let seen = reconciler.view().await;
            let _ = release.send(());
            seen
        };

        let (report, seen) = tokio::join!(dispatch, observe);
        assert_eq!(seen, vec![todo("1", "Buy milk")]);

        let report = report.unwrap();
        assert!(report.mutation.is_err());
        assert!(report.refetch.is_ok());
        assert!(reconciler.view().await.is_empty());
        assert_eq!(reconciler.phase().await, Phase::Idle);
    }

    #[tokio::test]
    async fn test_successful_add_takes_server_row() {
        let server = FakeServer::default();
        let reconciler = Reconciler::new(server.clone());

        let backend = server.clone();
        let report = reconciler
            .dispatch(ListAction::Add { item: todo("-1", "Walk dog") }, async move {
                backend.set(vec![todo("42", "Walk dog")]);
                Ok::<_, &str>(todo("42", "Walk dog"))
            })
            .await
            .unwrap();

        assert!(report.succeeded());
        assert_eq!(reconciler.view().await, vec![todo("42", "Walk dog")]);
    }

    #[tokio::test]
    async fn test_refetch_failure_drops_patch() {
        let server = FakeServer::default();
        server.set(vec![todo("1", "keep me")]);
        let reconciler = Reconciler::new(server.clone());
        reconciler.refresh().await.unwrap();

        server.go_offline();
        let report = reconciler
            .dispatch(ListAction::Delete { id: "1".to_string() }, async {
                Ok::<(), &str>(())
            })
            .await
            .unwrap();

        assert_eq!(report.refetch, Err("offline"));
        assert_eq!(reconciler.view().await, vec![todo("1", "keep me")]);
        assert!(!reconciler.is_pending().await);
    }

    #[tokio::test]
    async fn test_dispatch_while_pending_is_busy() {
        let reconciler = Reconciler::new(FakeServer::default());

        let (release, hold) = oneshot::channel::<()>();
        let first = reconciler.dispatch(ListAction::Delete { id: "1".to_string() }, async move {
            let _ = hold.await;
            Ok::<(), &str>(())
        });
        let second = async {
            tokio::task::yield_now().await;
            let busy = reconciler
                .dispatch(ListAction::Delete { id: "2".to_string() }, async {
                    Ok::<(), &str>(())
                })
                .await;
            let _ = release.send(());
            busy.map(|_| ())
        };

        let (first, second) = tokio::join!(first, second);
        assert!(first.is_ok());
        assert_eq!(second, Err(Busy));
    }

    #[tokio::test]
    async fn test_duplicate_rows_render_once() {
        let server = FakeServer::default();
        server.set(vec![todo("7", "first"), todo("7", "second")]);
        let reconciler = Reconciler::new(server);

        reconciler.refresh().await.unwrap();
        assert_eq!(reconciler.view().await, vec![todo("7", "first")]);
    }

    #[tokio::test]
    async fn test_slow_refresh_does_not_undo_a_delete() {
        let server = FakeServer::default();
        server.set(vec![todo("1", "stale")]);
        let (release, hold) = oneshot::channel::<()>();
        let reconciler = Reconciler::new(GatedServer {
            server: server.clone(),
            gate: StdMutex::new(Some(hold)),
        });

        let refresh = reconciler.refresh();
        let delete = async {
            tokio::task::yield_now().await;
            let backend = server.clone();
            let report = reconciler
                .dispatch(ListAction::Delete { id: "1".to_string() }, async move {
                    backend.set(Vec::new());
                    Ok::<(), &str>(())
                })
                .await
                .unwrap();
            let _ = release.send(());
            report
        };

        let (refreshed, report) = tokio::join!(refresh, delete);
        assert!(refreshed.is_ok());
        assert!(report.succeeded());
        assert!(reconciler.view().await.is_empty());
        assert_eq!(reconciler.phase().await, Phase::Idle);
    }
}
