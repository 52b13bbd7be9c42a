//! Account manager
//!
//! Orchestrates account creation and the money-granting flows around it.
//! The referral bonus is granted at most once per referred account: the
//! referring link is set only during creation, and creation happens at most
//! once per identity (the ledger rejects duplicate ids).

use crate::{config::AccountConfig, Error, Result};
use adapters::{Notifier, NotifyEvent};
use ledger_core::{Account, AccountId, Ledger, Profile, Transaction, TxnKind};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

/// Account manager
pub struct AccountManager {
    ledger: Arc<Ledger>,
    notifier: Arc<dyn Notifier>,
    config: AccountConfig,
}

impl AccountManager {
    /// Create a manager over the given ledger and notification channel
    pub fn new(ledger: Arc<Ledger>, notifier: Arc<dyn Notifier>, config: AccountConfig) -> Self {
        Self {
            ledger,
            notifier,
            config,
        }
    }

    /// Load or create the account for an identity
    ///
    /// Existing accounts get their profile fields refreshed and are returned
    /// monetarily unchanged. New accounts are created with zero balance,
    /// credited the signup bonus, and — when `referral_code` resolves to a
    /// distinct existing account — linked to their referrer, who receives
    /// the referral bonus exactly once. A self-referral is ignored.
    pub async fn authenticate(
        &self,
        id: AccountId,
        profile: Profile,
        referral_code: Option<&str>,
    ) -> Result<Account> {
        if self.ledger.find_account(id)?.is_some() {
            let account = self.ledger.update_profile(id, &profile).await?;
            return Ok(account);
        }

        let referrer = match referral_code {
            Some(code) => self
                .ledger
                .find_by_referral_code(code.trim())?
                .filter(|referrer| referrer.id != id),
            None => None,
        };

        let account = Account::new(id, profile.clone(), referrer.as_ref().map(|r| r.id));
        match self.ledger.create_account(account).await {
            Ok(_) => {}
            // lost a creation race; the winner already granted the bonuses
            Err(ledger_core::Error::AccountExists(_)) => {
                let account = self.ledger.update_profile(id, &profile).await?;
                return Ok(account);
            }
            Err(err) => return Err(err.into()),
        }

        self.ledger
            .credit(id, self.config.signup_bonus, TxnKind::Bonus, "Welcome bonus")
            .await?;

        if let Some(referrer) = referrer {
            self.ledger
                .credit(
                    referrer.id,
                    self.config.referral_bonus,
                    TxnKind::Referral,
                    format!("Referral bonus: {}", profile.first_name),
                )
                .await?;
            self.ledger.increment_referral_count(referrer.id).await?;
            info!(
                referrer = %referrer.id,
                referred = %id,
                bonus = self.config.referral_bonus,
                "referral bonus granted"
            );
            self.notify(
                referrer.id,
                NotifyEvent::ReferralJoined {
                    referred: profile.first_name.clone(),
                    bonus: self.config.referral_bonus,
                },
            )
            .await;
        }

        info!(account = %id, bonus = self.config.signup_bonus, "new account registered");
        self.notify(
            id,
            NotifyEvent::Welcome {
                bonus: self.config.signup_bonus,
            },
        )
        .await;

        Ok(self.ledger.get_account(id)?)
    }

    /// Record a deposit and schedule its simulated confirmation
    ///
    /// The returned transaction is pending; a background task confirms it
    /// after the configured delay and notifies the user. Real gateway
    /// integration is out of scope.
    pub async fn request_deposit(
        &self,
        account: AccountId,
        amount: i64,
        method: &str,
    ) -> Result<Transaction> {
        if amount < self.config.min_deposit {
            return Err(Error::DepositBelowMinimum {
                minimum: self.config.min_deposit,
            });
        }

        let txn = self
            .ledger
            .record_pending(
                account,
                amount,
                TxnKind::Deposit,
                Some(method.to_string()),
                format!("Deposit ({})", method),
            )
            .await?;

        let ledger = self.ledger.clone();
        let notifier = self.notifier.clone();
        let delay = Duration::from_millis(self.config.deposit_confirm_delay_ms);
        let txn_id = txn.id.clone();
        let method = method.to_string();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            match ledger.confirm_pending(&txn_id).await {
                Ok(confirmed) => {
                    let balance = ledger.balance(account).unwrap_or(confirmed.amount);
                    let event = NotifyEvent::DepositConfirmed {
                        amount: confirmed.amount,
                        method,
                        balance,
                    };
                    if let Err(err) = notifier.notify(account, event).await {
                        warn!(account = %account, error = %err, "notification dropped");
                    }
                }
                Err(err) => {
                    warn!(txn = %txn_id, error = %err, "deposit confirmation failed");
                }
            }
        });

        Ok(txn)
    }

    /// Apply an administrative credit or debit
    ///
    /// Debits still respect the non-negative-balance invariant.
    pub async fn adjust_balance(
        &self,
        account: AccountId,
        amount: i64,
        reason: &str,
    ) -> Result<Account> {
        if amount == 0 {
            return Ok(self.ledger.get_account(account)?);
        }
        let description = if reason.is_empty() {
            "Adjusted by operator".to_string()
        } else {
            reason.to_string()
        };

        if amount > 0 {
            self.ledger
                .credit(account, amount, TxnKind::AdminAdjust, description.clone())
                .await?;
        } else {
            self.ledger
                .debit(account, -amount, TxnKind::AdminAdjust, description.clone())
                .await?;
        }

        self.notify(
            account,
            NotifyEvent::BalanceAdjusted {
                delta: amount,
                reason: description,
            },
        )
        .await;

        Ok(self.ledger.get_account(account)?)
    }

    async fn notify(&self, account: AccountId, event: NotifyEvent) {
        if let Err(err) = self.notifier.notify(account, event).await {
            warn!(account = %account, error = %err, "notification dropped");
        }
    }
}
