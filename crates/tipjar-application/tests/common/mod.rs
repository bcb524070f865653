#![allow(dead_code)]

use std::io::Cursor;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};

use async_trait::async_trait;
use image::{DynamicImage, ImageBuffer, ImageFormat, Rgb};
use tokio::sync::Notify;

use tipjar_core::content::ContentStore;
use tipjar_core::image::ImageFile;
use tipjar_core::ledger::{
    Address, CallRequest, ContractCall, LedgerReader, ProfileRecord, ProfileSummary, TipStream,
    WalletSession, Wei,
};
use tipjar_core::{Result, TipjarError};
use tipjar_infrastructure::InMemoryLedger;

pub const FEE: Wei = Wei(100_000_000_000_000);
pub const START_TIME: u64 = 1_700_000_000;

pub fn addr(n: u8) -> Address {
    format!("0x{:040x}", n).parse().unwrap()
}

pub fn registry() -> Address {
    addr(1)
}

pub fn owner() -> Address {
    addr(10)
}

pub fn fan() -> Address {
    addr(20)
}

/// Ledger whose block clock the test advances by hand.
pub struct Chain {
    pub ledger: Arc<InMemoryLedger>,
    pub clock: Arc<AtomicU64>,
}

impl Chain {
    pub fn new() -> Self {
        let clock = Arc::new(AtomicU64::new(START_TIME));
        let time = Arc::clone(&clock);
        let ledger = InMemoryLedger::new(registry(), FEE)
            .with_clock(move || time.load(Ordering::SeqCst));
        Self {
            ledger: Arc::new(ledger),
            clock,
        }
    }

    pub fn advance(&self, seconds: u64) {
        self.clock.fetch_add(seconds, Ordering::SeqCst);
    }

    pub async fn claim_with(
        &self,
        account: Address,
        handle: &str,
        social_profiles: Vec<String>,
    ) -> Address {
        self.ledger.connect(Some(account));
        self.ledger
            .submit(vec![
                CallRequest::new(
                    registry(),
                    ContractCall::CreateProfile {
                        username: handle.into(),
                        about_me: String::new(),
                        social_profiles,
                    },
                )
                .with_value(FEE),
            ])
            .await
            .unwrap();
        self.ledger.profile_address(handle).await.unwrap()
    }

    pub async fn claim(&self, account: Address, handle: &str) -> Address {
        self.claim_with(account, handle, vec![]).await
    }

    /// Sends a tip from `from` and advances the clock one second.
    pub async fn tip(&self, from: Address, profile: &Address, wei: u128, message: &str) {
        self.ledger.connect(Some(from));
        self.ledger
            .submit(vec![
                CallRequest::new(
                    profile.clone(),
                    ContractCall::AddTip {
                        message: message.into(),
                    },
                )
                .with_value(Wei(wei)),
            ])
            .await
            .unwrap();
        self.advance(1);
    }
}

/// Delegating reader with switchable read failures and a lookup counter.
pub struct FlakyLedger {
    inner: Arc<InMemoryLedger>,
    pub fail_reads: AtomicBool,
    pub lookups: AtomicUsize,
}

impl FlakyLedger {
    pub fn new(inner: Arc<InMemoryLedger>) -> Arc<Self> {
        Arc::new(Self {
            inner,
            fail_reads: AtomicBool::new(false),
            lookups: AtomicUsize::new(0),
        })
    }

    pub fn set_failing(&self, failing: bool) {
        self.fail_reads.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(TipjarError::ledger("rpc unavailable"));
        }
        Ok(())
    }
}

#[async_trait]
impl LedgerReader for FlakyLedger {
    async fn profile_address(&self, handle: &str) -> Result<Address> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        self.inner.profile_address(handle).await
    }

    async fn profile_details(&self, profile: &Address) -> Result<ProfileRecord> {
        self.check()?;
        self.inner.profile_details(profile).await
    }

    async fn owner(&self, profile: &Address) -> Result<Address> {
        self.check()?;
        self.inner.owner(profile).await
    }

    async fn balance(&self, profile: &Address) -> Result<Wei> {
        self.check()?;
        self.inner.balance(profile).await
    }

    async fn latest_profiles(&self) -> Result<Vec<ProfileSummary>> {
        self.check()?;
        self.inner.latest_profiles().await
    }

    async fn subscribe_tips(&self, profile: &Address) -> Result<TipStream> {
        self.check()?;
        self.inner.subscribe_tips(profile).await
    }
}

/// Content store that hands out sequential ids, optionally failing or
/// holding each upload until released.
pub struct MockContentStore {
    uploads: AtomicUsize,
    pub fail: AtomicBool,
    pub hold: AtomicBool,
    pub release: Notify,
}

impl MockContentStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            uploads: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
            hold: AtomicBool::new(false),
            release: Notify::new(),
        })
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ContentStore for MockContentStore {
    async fn upload(&self, file: &ImageFile) -> Result<String> {
        if self.hold.load(Ordering::SeqCst) {
            self.release.notified().await;
        }
        if self.fail.load(Ordering::SeqCst) {
            return Err(TipjarError::upload(format!("{} rejected", file.file_name)));
        }
        let n = self.uploads.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("cid-{n}"))
    }

    fn uri_for(&self, content_id: &str) -> String {
        format!("https://gateway.test/ipfs/{content_id}")
    }
}

pub fn png(width: u32, height: u32) -> ImageFile {
    let buffer = ImageBuffer::from_pixel(width, height, Rgb([10u8, 120, 200]));
    let mut bytes = Vec::new();
    DynamicImage::ImageRgb8(buffer)
        .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
        .unwrap();
    ImageFile {
        file_name: "picture.png".into(),
        mime_type: "image/png".into(),
        bytes,
    }
}
