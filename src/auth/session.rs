use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 服务端会话记录
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Session {
    pub session_id: String,
    pub user_id: String,
    pub origin: String, // 请求上下文（客户端来源）
    pub created_at: i64,
    pub last_seen_at: i64,
}

/// 进程内会话存储
///
/// 以会话ID为键的并发映射，分片锁保证同一ID上的操作可线性化。
/// 存活窗口相对 last_seen_at 滑动，每次有效性检查即触达。
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<DashMap<String, Session>>,
    ttl_secs: i64,
}

impl SessionStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(DashMap::new()),
            ttl_secs: ttl.as_secs() as i64,
        }
    }

    /// 创建会话并返回新生成的会话ID，保证不与存活会话冲突
    pub fn create(&self, user_id: &str, origin: &str) -> String {
        loop {
            let session_id = Uuid::new_v4().to_string();
            match self.inner.entry(session_id.clone()) {
                Entry::Occupied(_) => continue,
                Entry::Vacant(vacant) => {
                    let now = Utc::now().timestamp();
                    vacant.insert(Session {
                        session_id: session_id.clone(),
                        user_id: user_id.to_string(),
                        origin: origin.to_string(),
                        created_at: now,
                        last_seen_at: now,
                    });
                    tracing::debug!("Created session for user: {}", user_id);
                    return session_id;
                }
            }
        }
    }

    /// 会话存在且未超出存活窗口则有效，同时刷新 last_seen_at
    pub fn is_valid(&self, session_id: &str) -> bool {
        let now = Utc::now().timestamp();
        let expired = match self.inner.get_mut(session_id) {
            None => return false,
            Some(mut session) => {
                if now - session.last_seen_at > self.ttl_secs {
                    true
                } else {
                    session.last_seen_at = now;
                    false
                }
            }
        };

        if expired {
            self.inner.remove(session_id);
        }
        !expired
    }

    /// 删除会话；幂等，删除不存在的会话不报错
    pub fn invalidate(&self, session_id: &str) {
        if self.inner.remove(session_id).is_some() {
            tracing::debug!("Invalidated session: {}", session_id);
        }
    }

    /// 清理超出存活窗口的会话，返回清理数量
    pub fn purge_expired(&self) -> usize {
        let now = Utc::now().timestamp();
        let before = self.inner.len();
        self.inner
            .retain(|_, session| now - session.last_seen_at <= self.ttl_secs);
        before - self.inner.len()
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    #[cfg(test)]
    fn backdate(&self, session_id: &str, secs: i64) {
        if let Some(mut session) = self.inner.get_mut(session_id) {
            session.last_seen_at -= secs;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn store() -> SessionStore {
        SessionStore::new(Duration::from_secs(1800))
    }

    #[test]
    fn session_is_valid_right_after_creation() {
        let sessions = store();
        let sid = sessions.create("alice", "127.0.0.1");
        assert!(sessions.is_valid(&sid));
    }

    #[test]
    fn invalidate_removes_session_and_is_idempotent() {
        let sessions = store();
        let sid = sessions.create("alice", "127.0.0.1");

        sessions.invalidate(&sid);
        assert!(!sessions.is_valid(&sid));

        // 重复删除与删除未知ID均不报错
        sessions.invalidate(&sid);
        sessions.invalidate("no-such-session");
    }

    #[test]
    fn session_ids_are_unique() {
        let sessions = store();
        let ids: HashSet<String> = (0..1000).map(|_| sessions.create("alice", "ctx")).collect();
        assert_eq!(ids.len(), 1000);
    }

    #[test]
    fn session_expires_after_liveness_window() {
        let sessions = store();
        let sid = sessions.create("alice", "127.0.0.1");

        sessions.backdate(&sid, 1801);
        assert!(!sessions.is_valid(&sid));
        // 过期的会话已被移除
        assert!(sessions.is_empty());
    }

    #[test]
    fn liveness_check_slides_the_window() {
        let sessions = store();
        let sid = sessions.create("alice", "127.0.0.1");

        // 每次触达都在窗口内，则会话持续存活
        sessions.backdate(&sid, 1000);
        assert!(sessions.is_valid(&sid));
        sessions.backdate(&sid, 1000);
        assert!(sessions.is_valid(&sid));
    }

    #[test]
    fn purge_removes_only_expired_sessions() {
        let sessions = store();
        let stale = sessions.create("alice", "127.0.0.1");
        let fresh = sessions.create("bob", "127.0.0.1");

        sessions.backdate(&stale, 3600);
        assert_eq!(sessions.purge_expired(), 1);
        assert_eq!(sessions.len(), 1);
        assert!(sessions.is_valid(&fresh));
        assert!(!sessions.is_valid(&stale));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_creation_yields_unique_live_sessions() {
        let sessions = store();
        let mut handles = Vec::new();
        for i in 0..16 {
            let sessions = sessions.clone();
            handles.push(tokio::spawn(async move {
                let user = format!("user-{}", i);
                (0..64)
                    .map(|_| sessions.create(&user, "ctx"))
                    .collect::<Vec<_>>()
            }));
        }

        let mut ids = HashSet::new();
        for handle in handles {
            for sid in handle.await.unwrap() {
                assert!(sessions.is_valid(&sid));
                assert!(ids.insert(sid));
            }
        }
        assert_eq!(ids.len(), 16 * 64);
    }
}
