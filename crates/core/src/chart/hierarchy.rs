//! Parent/child validation and balance rollup.

use std::collections::{HashMap, HashSet, VecDeque};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tally_shared::types::AccountId;

use crate::ledger::balance::{AccountBalance, convert_direction};
use crate::ledger::error::LedgerError;
use crate::ledger::types::AccountType;

/// Balance of an account together with all of its descendants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollupBalance {
    /// The rolled-up account.
    pub account_id: AccountId,
    /// Account code.
    pub code: String,
    /// Account type; every child balance is expressed in its direction.
    pub account_type: AccountType,
    /// The account's own balance.
    pub own_balance: Decimal,
    /// Own balance plus every descendant's balance.
    pub total_balance: Decimal,
    /// Number of descendants included.
    pub descendant_count: usize,
}

/// Stateless service for hierarchy rules.
pub struct HierarchyService;

impl HierarchyService {
    /// Ensures that making `new_parent` the parent of `account` keeps the tree acyclic.
    ///
    /// `parent_of` returns the current parent of an account. Pass `None` for
    /// `account` when it does not exist yet; a new account cannot close a cycle.
    ///
    /// # Errors
    ///
    /// Returns `InvalidHierarchy` if `account` is `new_parent` or one of its ancestors.
    pub fn ensure_acyclic<F>(
        account: Option<AccountId>,
        account_code: &str,
        new_parent: AccountId,
        parent_of: F,
    ) -> Result<(), LedgerError>
    where
        F: Fn(AccountId) -> Option<AccountId>,
    {
        let Some(account) = account else {
            return Ok(());
        };

        let mut seen = HashSet::new();
        let mut cursor = Some(new_parent);
        while let Some(current) = cursor {
            if current == account {
                return Err(LedgerError::InvalidHierarchy(format!(
                    "account {account_code} cannot be its own ancestor"
                )));
            }
            if !seen.insert(current) {
                return Err(LedgerError::InvalidHierarchy(
                    "existing hierarchy contains a cycle".to_string(),
                ));
            }
            cursor = parent_of(current);
        }
        Ok(())
    }

    /// Returns every descendant of `root`, breadth-first.
    ///
    /// `links` holds `(account, parent)` pairs for the whole chart.
    #[must_use]
    pub fn descendants(root: AccountId, links: &[(AccountId, Option<AccountId>)]) -> Vec<AccountId> {
        let mut children: HashMap<AccountId, Vec<AccountId>> = HashMap::new();
        for (id, parent) in links {
            if let Some(parent) = parent {
                children.entry(*parent).or_default().push(*id);
            }
        }

        let mut result = Vec::new();
        let mut visited = HashSet::from([root]);
        let mut queue = VecDeque::from([root]);
        while let Some(current) = queue.pop_front() {
            for child in children.get(&current).into_iter().flatten() {
                if visited.insert(*child) {
                    result.push(*child);
                    queue.push_back(*child);
                }
            }
        }
        result
    }

    /// Rolls descendant balances into `root`, each converted to the root's natural direction.
    #[must_use]
    pub fn rollup(root: &AccountBalance, descendants: &[AccountBalance]) -> RollupBalance {
        let children_total: Decimal = descendants
            .iter()
            .map(|d| convert_direction(d.balance, d.account_type, root.account_type))
            .sum();

        RollupBalance {
            account_id: root.account_id,
            code: root.code.clone(),
            account_type: root.account_type,
            own_balance: root.balance,
            total_balance: root.balance + children_total,
            descendant_count: descendants.len(),
        }
    }
}
