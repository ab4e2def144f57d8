use std::collections::HashMap;
use std::net::IpAddr;
use std::sync::{Arc, Mutex};

/// Counts live control connections per client address.
///
/// Lives in the accept loop only; sessions never touch it.
#[derive(Debug, Clone)]
pub struct ConnectionLimiter {
    max_per_ip: usize,
    active: Arc<Mutex<HashMap<IpAddr, usize>>>,
}

/// Releases one slot for its address when dropped.
#[derive(Debug)]
pub struct ConnectionGuard {
    ip: IpAddr,
    active: Arc<Mutex<HashMap<IpAddr, usize>>>,
}

impl ConnectionLimiter {
    /// `max_per_ip == 0` disables the limit.
    pub fn new(max_per_ip: usize) -> Self {
        Self {
            max_per_ip,
            active: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn try_acquire(&self, ip: IpAddr) -> Option<ConnectionGuard> {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        let count = active.entry(ip).or_insert(0);
        if self.max_per_ip != 0 && *count >= self.max_per_ip {
            return None;
        }
        *count += 1;
        Some(ConnectionGuard {
            ip,
            active: Arc::clone(&self.active),
        })
    }

    pub fn active_for(&self, ip: IpAddr) -> usize {
        let active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        active.get(&ip).copied().unwrap_or(0)
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let mut active = self.active.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(count) = active.get_mut(&self.ip) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                active.remove(&self.ip);
            }
        }
    }
}
