/// The result of submitting an order to the order ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOrderResult {
    /// The order was new and has been persisted under the given row id.
    Inserted(i64),
    /// The `(channel, external order id)` pair is already in the ledger; nothing was written.
    AlreadyProcessed,
}

impl InsertOrderResult {
    pub fn was_inserted(&self) -> bool {
        matches!(self, InsertOrderResult::Inserted(_))
    }
}
