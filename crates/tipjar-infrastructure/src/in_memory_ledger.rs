//! In-process ledger with the registry and profile contract rules.
//!
//! Serves as both [`LedgerReader`] and [`WalletSession`], so the whole
//! client can run (and be tested) without a chain. A submitted batch is
//! applied to a copy of the state and committed only if every call
//! succeeds; `TipReceived` events go out after the commit.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock};

use async_trait::async_trait;
use futures::StreamExt;
use tokio::sync::broadcast;
use uuid::Uuid;

use tipjar_core::editor::{MAX_ABOUT_ME_CHARS, MAX_SOCIAL_PROFILES};
use tipjar_core::handle::Handle;
use tipjar_core::ledger::{
    Address, CallRequest, ContractCall, LedgerReader, ProfileRecord, ProfileSummary, RawTip,
    TipEvent, TipStream, TxReceipt, WalletSession, Wei,
};
use tipjar_core::tipping::MAX_TIP_MESSAGE_CHARS;
use tipjar_core::{Result, TipjarError};

/// Tips kept in a profile's `recentTips`.
pub const RECENT_TIPS_LIMIT: usize = 200;

const EVENT_CAPACITY: usize = 64;

type Clock = Arc<dyn Fn() -> u64 + Send + Sync>;

#[derive(Clone)]
struct ProfileState {
    record: ProfileRecord,
    owner: Address,
    balance: Wei,
}

#[derive(Clone, Default)]
struct LedgerState {
    handles: HashMap<String, Address>,
    profiles: HashMap<Address, ProfileState>,
    /// Creation order.
    created: Vec<Address>,
    registry_balance: Wei,
    account_balances: HashMap<Address, Wei>,
}

pub struct InMemoryLedger {
    registry: Address,
    creation_fee: Wei,
    state: Mutex<LedgerState>,
    events: Mutex<HashMap<Address, broadcast::Sender<TipEvent>>>,
    account: RwLock<Option<Address>>,
    clock: Clock,
}

impl InMemoryLedger {
    pub fn new(registry: Address, creation_fee: Wei) -> Self {
        Self {
            registry,
            creation_fee,
            state: Mutex::new(LedgerState::default()),
            events: Mutex::new(HashMap::new()),
            account: RwLock::new(None),
            clock: Arc::new(|| chrono::Utc::now().timestamp().max(0) as u64),
        }
    }

    /// Replaces the block timestamp source.
    pub fn with_clock(mut self, clock: impl Fn() -> u64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn registry(&self) -> &Address {
        &self.registry
    }

    pub fn creation_fee(&self) -> Wei {
        self.creation_fee
    }

    /// Connects (or with `None`, disconnects) the wallet account.
    pub fn connect(&self, account: Option<Address>) {
        *self.account.write().unwrap_or_else(|e| e.into_inner()) = account;
    }

    /// Funds withdrawn to an account so far.
    pub fn account_balance(&self, account: &Address) -> Wei {
        self.lock_state()
            .account_balances
            .get(account)
            .copied()
            .unwrap_or_default()
    }

    /// Fees collected by the registry.
    pub fn registry_balance(&self) -> Wei {
        self.lock_state().registry_balance
    }

    /// Ends every live subscription on `profile`.
    pub fn close_subscriptions(&self, profile: &Address) {
        self.lock_events().remove(profile);
    }

    fn lock_state(&self) -> MutexGuard<'_, LedgerState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_events(&self) -> MutexGuard<'_, HashMap<Address, broadcast::Sender<TipEvent>>> {
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn next_profile_address(state: &LedgerState) -> Result<Address> {
        let seed = Uuid::new_v4().as_u128() ^ state.created.len() as u128;
        format!("0x5eed0000{seed:032x}").parse()
    }

    fn apply(
        &self,
        state: &mut LedgerState,
        signer: &Address,
        request: CallRequest,
        timestamp: u64,
        emitted: &mut Vec<(Address, TipEvent)>,
    ) -> Result<()> {
        let CallRequest { to, value, call } = request;

        if !call.is_payable() && !value.is_zero() {
            return Err(TipjarError::ledger(format!(
                "{} is not payable",
                call.function_name()
            )));
        }

        if let ContractCall::CreateProfile {
            username,
            about_me,
            social_profiles,
        } = call
        {
            if to != self.registry {
                return Err(TipjarError::ledger("createProfile must target the registry"));
            }
            let handle = Handle::parse(&username)?;
            if state.handles.contains_key(handle.as_str()) {
                return Err(TipjarError::ledger(format!(
                    "username '{handle}' is already taken"
                )));
            }
            if value < self.creation_fee {
                return Err(TipjarError::ledger(format!(
                    "creation fee is {} wei, got {}",
                    self.creation_fee, value
                )));
            }
            check_about_me(&about_me)?;
            if social_profiles.len() > MAX_SOCIAL_PROFILES {
                return Err(TipjarError::ledger("too many social profiles"));
            }

            let address = Self::next_profile_address(state)?;
            state.handles.insert(handle.to_string(), address.clone());
            state.created.push(address.clone());
            state.registry_balance = add(state.registry_balance, value)?;
            state.profiles.insert(
                address,
                ProfileState {
                    record: ProfileRecord {
                        username: handle.to_string(),
                        about_me,
                        social_profiles,
                        created: timestamp,
                        ..Default::default()
                    },
                    owner: signer.clone(),
                    balance: Wei::ZERO,
                },
            );
            return Ok(());
        }

        let profile = state
            .profiles
            .get_mut(&to)
            .ok_or_else(|| TipjarError::not_found("profile", to.to_string()))?;

        if let ContractCall::AddTip { message } = call {
            if value.is_zero() {
                return Err(TipjarError::ledger("tip must carry value"));
            }
            if message.chars().count() > MAX_TIP_MESSAGE_CHARS {
                return Err(TipjarError::ledger("tip message too long"));
            }
            profile.balance = add(profile.balance, value)?;
            profile.record.total_tips = add(profile.record.total_tips, value)?;
            profile.record.recent_tips.push(RawTip {
                value: value.to_string(),
                from: signer.to_string(),
                message: message.clone(),
                timestamp,
            });
            let overflow = profile
                .record
                .recent_tips
                .len()
                .saturating_sub(RECENT_TIPS_LIMIT);
            profile.record.recent_tips.drain(..overflow);
            emitted.push((
                to,
                TipEvent {
                    from: signer.to_string(),
                    amount: value.to_string(),
                    message,
                    block_timestamp: timestamp,
                },
            ));
            return Ok(());
        }

        if profile.owner != *signer {
            return Err(TipjarError::unauthorized(format!(
                "{} is not the owner of {}",
                signer, to
            )));
        }

        let record = &mut profile.record;
        match call {
            ContractCall::UpdateAboutMe(value) => {
                check_about_me(&value)?;
                record.about_me = value;
            }
            ContractCall::UpdateLocation(value) => record.location = value,
            ContractCall::UpdateProfilePicture(uri) => record.profile_picture = uri,
            ContractCall::UpdateBannerPicture(uri) => record.banner_picture = uri,
            ContractCall::AddSocialProfile(url) => {
                if record.social_profiles.len() >= MAX_SOCIAL_PROFILES {
                    return Err(TipjarError::ledger("too many social profiles"));
                }
                record.social_profiles.push(url);
            }
            ContractCall::UpdateSocialProfile { index, url } => {
                let slot = record
                    .social_profiles
                    .get_mut(index)
                    .ok_or_else(|| TipjarError::ledger(format!("no social profile at {index}")))?;
                *slot = url;
            }
            ContractCall::RemoveSocialProfile { index } => {
                if index >= record.social_profiles.len() {
                    return Err(TipjarError::ledger(format!("no social profile at {index}")));
                }
                record.social_profiles.remove(index);
            }
            ContractCall::Withdraw => {
                if profile.balance.is_zero() {
                    return Err(TipjarError::ledger("nothing to withdraw"));
                }
                let amount = std::mem::take(&mut profile.balance);
                let credited = state.account_balances.entry(signer.clone()).or_default();
                *credited = add(*credited, amount)?;
            }
            ContractCall::CreateProfile { .. } | ContractCall::AddTip { .. } => {
                return Err(TipjarError::internal("payable call reached owner dispatch"));
            }
        }
        Ok(())
    }

    fn profile<T>(&self, profile: &Address, read: impl FnOnce(&ProfileState) -> T) -> Result<T> {
        self.lock_state()
            .profiles
            .get(profile)
            .map(read)
            .ok_or_else(|| TipjarError::not_found("profile", profile.to_string()))
    }
}

fn check_about_me(value: &str) -> Result<()> {
    if value.chars().count() > MAX_ABOUT_ME_CHARS {
        return Err(TipjarError::ledger("about me too long"));
    }
    Ok(())
}

fn add(a: Wei, b: Wei) -> Result<Wei> {
    a.checked_add(b)
        .ok_or_else(|| TipjarError::ledger("balance overflow"))
}

#[async_trait]
impl LedgerReader for InMemoryLedger {
    async fn profile_address(&self, handle: &str) -> Result<Address> {
        Ok(self
            .lock_state()
            .handles
            .get(handle)
            .cloned()
            .unwrap_or_else(Address::zero))
    }

    async fn profile_details(&self, profile: &Address) -> Result<ProfileRecord> {
        self.profile(profile, |p| p.record.clone())
    }

    async fn owner(&self, profile: &Address) -> Result<Address> {
        self.profile(profile, |p| p.owner.clone())
    }

    async fn balance(&self, profile: &Address) -> Result<Wei> {
        self.profile(profile, |p| p.balance)
    }

    async fn latest_profiles(&self) -> Result<Vec<ProfileSummary>> {
        let state = self.lock_state();
        Ok(state
            .created
            .iter()
            .rev()
            .filter_map(|address| state.profiles.get(address))
            .map(|p| ProfileSummary {
                username: p.record.username.clone(),
                created: p.record.created,
            })
            .collect())
    }

    async fn subscribe_tips(&self, profile: &Address) -> Result<TipStream> {
        self.profile(profile, |_| ())?;
        let receiver = self
            .lock_events()
            .entry(profile.clone())
            .or_insert_with(|| broadcast::channel(EVENT_CAPACITY).0)
            .subscribe();

        let stream = futures::stream::unfold(receiver, |mut receiver| async move {
            loop {
                match receiver.recv().await {
                    Ok(event) => return Some((event, receiver)),
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!("Tip subscription lagged, skipped {} events", skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => return None,
                }
            }
        });
        Ok(stream.boxed())
    }
}

#[async_trait]
impl WalletSession for InMemoryLedger {
    fn active_account(&self) -> Option<Address> {
        self.account.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    async fn submit(&self, calls: Vec<CallRequest>) -> Result<TxReceipt> {
        let signer = self
            .active_account()
            .ok_or_else(|| TipjarError::unauthorized("no wallet connected"))?;
        if calls.is_empty() {
            return Err(TipjarError::validation("empty transaction batch"));
        }

        let call_count = calls.len();
        let timestamp = (self.clock)();
        let mut emitted = Vec::new();
        {
            let mut state = self.lock_state();
            let mut next = state.clone();
            for request in calls {
                let function = request.call.function_name();
                self.apply(&mut next, &signer, request, timestamp, &mut emitted)
                    .inspect_err(|e| tracing::debug!("{} reverted: {}", function, e))?;
            }
            *state = next;
        }

        let events = self.lock_events();
        for (profile, event) in emitted {
            if let Some(sender) = events.get(&profile) {
                // No receivers is fine.
                let _ = sender.send(event);
            }
        }

        let transaction_hash = format!(
            "0x{}{}",
            Uuid::new_v4().simple(),
            Uuid::new_v4().simple()
        );
        tracing::debug!("Committed {} call(s) in {}", call_count, transaction_hash);
        Ok(TxReceipt {
            transaction_hash,
            call_count,
        })
    }
}
