//! In-memory stores used by the router and handler tests in place of Postgres.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Mutex,
};

use async_trait::async_trait;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::inputs::{
    repo::InputStore,
    repo_types::{InputFilter, InputPatch, InputRecord, NewInput},
};
use crate::users::{
    repo::UserStore,
    repo_types::{NewUser, User},
};

#[derive(Default)]
pub struct MemoryUserStore {
    users: Mutex<Vec<User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<User>> {
        let users = self.users.lock().unwrap();
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn create(&self, user: NewUser) -> anyhow::Result<Option<User>> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == user.email) {
            return Ok(None);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: user.email,
            password_hash: user.password_hash,
            first_name: user.first_name,
            last_name: user.last_name,
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(Some(user))
    }

    async fn delete_by_email(&self, email: &str) -> anyhow::Result<bool> {
        let mut users = self.users.lock().unwrap();
        let before = users.len();
        users.retain(|u| u.email != email);
        Ok(users.len() != before)
    }
}

/// Counts every call so tests can assert the store was never reached.
#[derive(Default)]
pub struct MemoryInputStore {
    records: Mutex<Vec<InputRecord>>,
    calls: AtomicUsize,
    failing: bool,
}

impl MemoryInputStore {
    /// A store whose every operation errors, as an unreachable database would.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Default::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn snapshot(&self) -> Vec<InputRecord> {
        self.records.lock().unwrap().clone()
    }

    fn enter(&self) -> anyhow::Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing {
            anyhow::bail!("connection refused");
        }
        Ok(())
    }
}

#[async_trait]
impl InputStore for MemoryInputStore {
    async fn find(&self, filter: &InputFilter) -> anyhow::Result<Vec<InputRecord>> {
        self.enter()?;
        let records = self.records.lock().unwrap();
        Ok(records
            .iter()
            .filter(|r| match &filter.username {
                Some(name) => &r.username == name,
                None => true,
            })
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<InputRecord>> {
        self.enter()?;
        let records = self.records.lock().unwrap();
        Ok(records.iter().find(|r| r.id == id).cloned())
    }

    async fn create(&self, input: NewInput) -> anyhow::Result<InputRecord> {
        self.enter()?;
        let record = InputRecord {
            id: Uuid::new_v4(),
            age: input.age,
            income: input.income,
            savings: input.savings,
            contribution: input.contribution,
            retirement_age: input.retirement_age,
            expenses: input.expenses,
            username: input.username,
        };
        self.records.lock().unwrap().push(record.clone());
        Ok(record)
    }

    async fn update(&self, id: Uuid, patch: InputPatch) -> anyhow::Result<bool> {
        self.enter()?;
        let mut records = self.records.lock().unwrap();
        let Some(r) = records.iter_mut().find(|r| r.id == id) else {
            return Ok(false);
        };
        if let Some(v) = patch.age {
            r.age = v;
        }
        if let Some(v) = patch.income {
            r.income = v;
        }
        if let Some(v) = patch.savings {
            r.savings = v;
        }
        if let Some(v) = patch.contribution {
            r.contribution = v;
        }
        if let Some(v) = patch.retirement_age {
            r.retirement_age = v;
        }
        if let Some(v) = patch.expenses {
            r.expenses = v;
        }
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> anyhow::Result<bool> {
        self.enter()?;
        let mut records = self.records.lock().unwrap();
        let before = records.len();
        records.retain(|r| r.id != id);
        Ok(records.len() != before)
    }
}
