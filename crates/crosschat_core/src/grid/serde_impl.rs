use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::Grid;

/// Grids travel over the wire as an array of row arrays, `grid[row][col]`
impl<T> Serialize for Grid<T>
where
    T: Serialize,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let rows: Vec<Vec<&T>> = self.iter_rows().map(|row| row.collect()).collect();
        rows.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for Grid<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let rows = Vec::<Vec<T>>::deserialize(deserializer)?;

        Grid::from_rows(rows).ok_or_else(|| D::Error::custom("grid rows differ in length"))
    }
}
