use crate::four_vector::FourVector;

/// Sort by decreasing energy
///
/// The sort is stable: entries with equal energy keep their relative
/// order, so the output only depends on the input order of the
/// generator record.
pub fn order_by_energy<T: AsRef<FourVector>>(mut records: Vec<T>) -> Vec<T> {
    sort_by_energy(&mut records);
    records
}

/// In-place version of [order_by_energy]
pub fn sort_by_energy<T: AsRef<FourVector>>(records: &mut [T]) {
    records.sort_by(|a, b| b.as_ref().e().cmp(&a.as_ref().e()));
}

/// Check that energies are non-increasing
pub fn is_energy_ordered<T: AsRef<FourVector>>(records: &[T]) -> bool {
    records
        .windows(2)
        .all(|w| w[0].as_ref().e() >= w[1].as_ref().e())
}
