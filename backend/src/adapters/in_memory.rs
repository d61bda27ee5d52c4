use crate::domain::{
    AuthKeyError, AuthKeyStore, Caller, KeyRef, Notifier, Recipients, Recurser, RecurserStore,
    StoreError, Subscription,
};
use async_trait::async_trait;
use chrono::Weekday;
use secrecy::Secret;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Subscriber records held in process memory. Counts every write it is
/// asked to make and can be told to fail reads, or writes for given ids.
#[derive(Default)]
pub struct InMemoryRecurserStore {
    records: Mutex<BTreeMap<String, Recurser>>,
    set_calls: AtomicUsize,
    delete_calls: AtomicUsize,
    unset_calls: AtomicUsize,
    fail_reads: AtomicBool,
    fail_list_eligible: AtomicBool,
    fail_list_skipping: AtomicBool,
    failing_writes: Mutex<HashSet<String>>,
}

impl InMemoryRecurserStore {
    pub fn with_recursers(recursers: Vec<Recurser>) -> Self {
        let store = Self::default();
        {
            let mut records = lock(&store.records);
            for recurser in recursers {
                records.insert(recurser.id.clone(), recurser);
            }
        }
        store
    }

    pub fn get(&self, recurser_id: &str) -> Option<Recurser> {
        lock(&self.records).get(recurser_id).cloned()
    }

    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn delete_calls(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }

    pub fn unset_calls(&self) -> usize {
        self.unset_calls.load(Ordering::SeqCst)
    }

    pub fn fail_reads(&self) {
        self.fail_reads.store(true, Ordering::SeqCst);
    }

    pub fn fail_list_eligible(&self) {
        self.fail_list_eligible.store(true, Ordering::SeqCst);
    }

    pub fn fail_list_skipping(&self) {
        self.fail_list_skipping.store(true, Ordering::SeqCst);
    }

    pub fn fail_writes_for(&self, recurser_id: &str) {
        lock(&self.failing_writes).insert(recurser_id.to_string());
    }

    fn check_read(&self) -> Result<(), StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("the in-memory store is refusing reads").into());
        }
        Ok(())
    }

    fn check_write(&self, recurser_id: &str) -> Result<(), StoreError> {
        if lock(&self.failing_writes).contains(recurser_id) {
            return Err(anyhow::anyhow!("the in-memory store is refusing writes for {}", recurser_id).into());
        }
        Ok(())
    }

    fn filtered(&self, predicate: impl Fn(&Recurser) -> bool) -> Result<Vec<Recurser>, StoreError> {
        self.check_read()?;
        Ok(lock(&self.records)
            .values()
            .filter(|recurser| predicate(recurser))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl RecurserStore for InMemoryRecurserStore {
    async fn get_by_id(&self, caller: &Caller) -> Result<Subscription, StoreError> {
        self.check_read()?;
        match lock(&self.records).get(&caller.id) {
            Some(stored) => {
                let mut recurser = stored.clone();
                recurser.name = caller.name.clone();
                recurser.email = caller.email.clone();
                Ok(Subscription::Subscribed(recurser))
            }
            None => Ok(Subscription::NotSubscribed(Recurser::new_subscriber(caller))),
        }
    }

    async fn set(&self, recurser: &Recurser) -> Result<(), StoreError> {
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write(&recurser.id)?;
        lock(&self.records).insert(recurser.id.clone(), recurser.clone());
        Ok(())
    }

    async fn delete(&self, recurser_id: &str) -> Result<(), StoreError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write(recurser_id)?;
        lock(&self.records).remove(recurser_id);
        Ok(())
    }

    async fn get_all(&self) -> Result<Vec<Recurser>, StoreError> {
        self.filtered(|_| true)
    }

    async fn list_eligible(&self, day: Weekday) -> Result<Vec<Recurser>, StoreError> {
        if self.fail_list_eligible.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("the in-memory store is refusing to list eligible subscribers").into());
        }
        self.filtered(|recurser| !recurser.is_skipping_tomorrow && recurser.schedule.is_scheduled(day))
    }

    async fn list_skipping_tomorrow(&self) -> Result<Vec<Recurser>, StoreError> {
        if self.fail_list_skipping.load(Ordering::SeqCst) {
            return Err(anyhow::anyhow!("the in-memory store is refusing to list skipping subscribers").into());
        }
        self.filtered(|recurser| recurser.is_skipping_tomorrow)
    }

    async fn unset_skipping_tomorrow(&self, recurser: &Recurser) -> Result<(), StoreError> {
        self.unset_calls.fetch_add(1, Ordering::SeqCst);
        self.check_write(&recurser.id)?;
        if let Some(stored) = lock(&self.records).get_mut(&recurser.id) {
            stored.is_skipping_tomorrow = false;
        }
        Ok(())
    }
}

#[derive(Default)]
pub struct InMemoryAuthKeyStore {
    keys: HashMap<(String, String), Secret<String>>,
}

impl InMemoryAuthKeyStore {
    pub fn with_key(mut self, key: KeyRef, value: impl Into<String>) -> Self {
        self.keys.insert(
            (key.namespace.to_string(), key.name.to_string()),
            Secret::new(value.into()),
        );
        self
    }
}

#[async_trait]
impl AuthKeyStore for InMemoryAuthKeyStore {
    async fn get_key(&self, namespace: &str, name: &str) -> Result<Secret<String>, AuthKeyError> {
        self.keys
            .get(&(namespace.to_string(), name.to_string()))
            .cloned()
            .ok_or_else(|| AuthKeyError::MissingKey(format!("{}/{}", namespace, name)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    pub recipients: Recipients,
    pub body: String,
}

/// Keeps every message it delivers. Sends addressed to a failing recipient
/// are rejected and not kept.
#[derive(Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<SentMessage>>,
    failing_recipients: Mutex<HashSet<String>>,
    attempts: AtomicUsize,
}

impl RecordingNotifier {
    pub fn fail_for(&self, email: &str) {
        lock(&self.failing_recipients).insert(email.to_string());
    }

    pub fn sent(&self) -> Vec<SentMessage> {
        lock(&self.sent).clone()
    }

    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send_message(
        &self,
        _credential: &Secret<String>,
        recipients: &Recipients,
        body: &str,
    ) -> Result<(), anyhow::Error> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        let failing = lock(&self.failing_recipients);
        if let Some(address) = recipients
            .addresses()
            .iter()
            .find(|address| failing.contains(address.as_str()))
        {
            anyhow::bail!("{} could not be reached", address);
        }
        drop(failing);

        lock(&self.sent).push(SentMessage {
            recipients: recipients.clone(),
            body: body.to_string(),
        });
        Ok(())
    }
}
