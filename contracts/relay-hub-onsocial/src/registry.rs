//! Relay lifecycle: Unknown → Staked → Registered → Removed → Unknown.
//!
//! Each transition is computed as a pure function of the current record and
//! applied only after the value transfer it implies has succeeded.

use near_sdk::AccountId;

use crate::{HubConfig, HubError, HubEvent, Ledger, Registration, Relay, RelayHub, RelayState, RelayView};

impl Relay {
    fn staked(
        &self,
        relay_id: &AccountId,
        caller: &AccountId,
        value: u128,
        unstake_delay: u64,
        config: &HubConfig,
    ) -> Result<Relay, HubError> {
        if relay_id == caller {
            return Err(HubError::InvalidCaller);
        }
        match self.state {
            RelayState::Unknown => {}
            RelayState::Staked if self.is_owned_by(caller) => {}
            RelayState::Staked => return Err(HubError::NotOwner),
            _ => return Err(HubError::InvalidState),
        }
        let total_stake = self
            .total_stake
            .checked_add(value)
            .ok_or_else(|| HubError::InvalidInput("stake overflow".into()))?;
        if total_stake < config.min_stake.0 || unstake_delay < config.min_unstake_delay {
            return Err(HubError::BelowMinimum);
        }
        if unstake_delay > config.max_unstake_delay {
            return Err(HubError::AboveMaximum);
        }
        if unstake_delay < self.unstake_delay {
            return Err(HubError::DelayDecreased);
        }
        Ok(Relay {
            owner: Some(caller.clone()),
            total_stake,
            unstake_delay,
            state: RelayState::Staked,
            unstake_time: 0,
            registration: None,
        })
    }

    fn registered(
        &self,
        transaction_fee: u32,
        url: String,
        relay_balance: u128,
        config: &HubConfig,
    ) -> Result<Relay, HubError> {
        if !matches!(self.state, RelayState::Staked | RelayState::Registered) {
            return Err(HubError::InvalidState);
        }
        if relay_balance < config.min_relay_balance.0 {
            return Err(HubError::RelayBalanceTooLow);
        }
        Ok(Relay {
            state: RelayState::Registered,
            registration: Some(Registration {
                transaction_fee,
                url,
            }),
            ..self.clone()
        })
    }

    fn removed(&self, caller: &AccountId, now: u64) -> Result<Relay, HubError> {
        if !self.is_owned_by(caller) {
            return Err(HubError::NotOwner);
        }
        match self.state {
            RelayState::Staked | RelayState::Registered => {}
            RelayState::Removed => return Err(HubError::AlreadyRemoved),
            _ => return Err(HubError::InvalidState),
        }
        Ok(Relay {
            state: RelayState::Removed,
            unstake_time: now.saturating_add(self.unstake_delay),
            registration: None,
            ..self.clone()
        })
    }

    /// Returns the stake to pay back to the owner.
    fn unstakeable(&self, caller: &AccountId, now: u64) -> Result<u128, HubError> {
        if self.state != RelayState::Removed {
            return Err(HubError::NotPendingUnstake);
        }
        if !self.is_owned_by(caller) {
            return Err(HubError::NotOwner);
        }
        if now < self.unstake_time {
            return Err(HubError::NotDue);
        }
        Ok(self.total_stake)
    }
}

impl RelayHub {
    /// Lock `value` from `caller` as stake for `relay`. The first stake makes
    /// `caller` the owner; later stakes must come from the same owner.
    pub fn stake(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: &AccountId,
        relay: &AccountId,
        value: u128,
        unstake_delay: u64,
    ) -> Result<(), HubError> {
        let current = self.relays.get(relay).cloned().unwrap_or_default();
        let next = current.staked(relay, caller, value, unstake_delay, &self.config)?;

        let hub = ledger.hub_account().clone();
        ledger.transfer(caller, &hub, value)?;

        let event = HubEvent::Staked {
            relay: relay.clone(),
            stake: next.total_stake,
            unstake_delay,
        };
        self.relays.insert(relay.clone(), next);
        self.emit(ledger, event);
        Ok(())
    }

    /// Called by the relay itself. Re-registering updates fee and url.
    pub fn register_relay(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: &AccountId,
        transaction_fee: u32,
        url: String,
    ) -> Result<(), HubError> {
        let current = self.relays.get(caller).ok_or(HubError::InvalidState)?;
        let next = current.registered(
            transaction_fee,
            url.clone(),
            ledger.account_balance(caller),
            &self.config,
        )?;
        let owner = next.owner.clone().ok_or(HubError::InvalidState)?;

        let event = HubEvent::RelayAdded {
            relay: caller.clone(),
            owner,
            transaction_fee,
            stake: next.total_stake,
            unstake_delay: next.unstake_delay,
            url,
        };
        self.relays.insert(caller.clone(), next);
        self.emit(ledger, event);
        Ok(())
    }

    pub fn remove_relay_by_owner(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: &AccountId,
        relay: &AccountId,
    ) -> Result<(), HubError> {
        let current = self.relays.get(relay).cloned().unwrap_or_default();
        let next = current.removed(caller, ledger.block_timestamp())?;

        let event = HubEvent::RelayRemoved {
            relay: relay.clone(),
            unstake_time: next.unstake_time,
        };
        self.relays.insert(relay.clone(), next);
        self.emit(ledger, event);
        Ok(())
    }

    /// Pay the full stake back to the owner and reset the relay to Unknown.
    pub fn unstake(
        &mut self,
        ledger: &mut dyn Ledger,
        caller: &AccountId,
        relay: &AccountId,
    ) -> Result<u128, HubError> {
        let current = self.relays.get(relay).cloned().unwrap_or_default();
        let stake = current.unstakeable(caller, ledger.block_timestamp())?;

        let hub = ledger.hub_account().clone();
        ledger.transfer(&hub, caller, stake)?;

        self.relays.remove(relay);
        self.emit(
            ledger,
            HubEvent::Unstaked {
                relay: relay.clone(),
                stake,
            },
        );
        Ok(stake)
    }

    /// Zeroed defaults for relays the hub has never seen.
    pub fn get_relay(&self, relay: &AccountId) -> RelayView {
        self.relays
            .get(relay)
            .map(RelayView::from)
            .unwrap_or_else(|| RelayView::from(&Relay::default()))
    }

    pub fn relay(&self, relay: &AccountId) -> Option<&Relay> {
        self.relays.get(relay)
    }

    pub fn is_registered(&self, relay: &AccountId) -> bool {
        self.relays
            .get(relay)
            .is_some_and(|r| r.state == RelayState::Registered)
    }
}
