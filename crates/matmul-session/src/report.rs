use matmul_codec::Matrix;

/// Receives the matrices a session produces.
///
/// Both tasks report through the same reporter, so implementations must be
/// shareable across threads. Calls never overlap for the same round: the
/// producer reports a round's operands before handing off, the consumer
/// reports its result before handing back.
pub trait Reporter: Send + Sync {
    /// Operands generated for `round`, in send order.
    fn batch(&self, _round: u64, _operands: &[Matrix]) {}

    /// Product received for `round`.
    fn result(&self, round: u64, product: &Matrix);
}
