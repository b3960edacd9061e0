use std::collections::HashMap;
use std::net::TcpStream;
use std::sync::Mutex;

/// Per-endpoint connection pool.
///
/// Streams are keyed by their `"ip:port"` endpoint. A stream is *taken out*
/// of the map for the duration of a call and put back on success, which
/// keeps at most one outstanding call per pooled connection; a failed call
/// simply drops the taken stream, which is the pool-invalidation path.
///
/// The lock is held only around map operations, never across I/O.
#[derive(Default)]
pub struct ConnectionPool {
    connections: Mutex<HashMap<String, TcpStream>>,
}

impl ConnectionPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Removes and returns the pooled stream for `endpoint`, if any.
    pub fn take(&self, endpoint: &str) -> Option<TcpStream> {
        self.connections.lock().unwrap().remove(endpoint)
    }

    /// Returns a healthy stream to the pool.
    pub fn put(&self, endpoint: impl Into<String>, stream: TcpStream) {
        self.connections.lock().unwrap().insert(endpoint.into(), stream);
    }

    pub fn contains(&self, endpoint: &str) -> bool {
        self.connections.lock().unwrap().contains_key(endpoint)
    }

    pub fn len(&self) -> usize {
        self.connections.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.connections.lock().unwrap().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::TcpListener;
    use std::sync::Arc;
    use std::thread;

    fn connected_pair(listener: &TcpListener) -> TcpStream {
        let addr = listener.local_addr().unwrap();
        let accepted = thread::scope(|scope| {
            let handle = scope.spawn(|| listener.accept().unwrap().0);
            let _client = TcpStream::connect(addr).unwrap();
            handle.join().unwrap()
        });
        accepted
    }

    #[test]
    fn test_take_removes_entry() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let pool = ConnectionPool::new();
        pool.put("a:1", connected_pair(&listener));

        assert!(pool.contains("a:1"));
        let stream = pool.take("a:1").unwrap();
        assert!(!pool.contains("a:1"));
        assert!(pool.take("a:1").is_none());
        drop(stream);
    }

    // Entry present implies the descriptor is open: hammer take/put from
    // several threads and verify every stream pulled out of the map still
    // answers peer_addr().
    #[test]
    fn test_concurrent_take_put_keeps_streams_open() {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let pool = Arc::new(ConnectionPool::new());

        for i in 0..4 {
            pool.put(format!("ep:{}", i), connected_pair(&listener));
        }

        let mut handles = Vec::new();
        for worker in 0..8 {
            let pool = Arc::clone(&pool);
            handles.push(thread::spawn(move || {
                for round in 0..200 {
                    let endpoint = format!("ep:{}", (worker + round) % 4);
                    if let Some(stream) = pool.take(&endpoint) {
                        assert!(stream.peer_addr().is_ok());
                        pool.put(endpoint, stream);
                    }
                }
            }));
        }
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(pool.len(), 4);
    }
}
