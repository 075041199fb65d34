use diesel::prelude::*;

use crate::domain::product::{ImageSlots, NewProduct, Product};
use crate::domain::types::ProductId;
use crate::models::product::{
    NewProduct as DbNewProduct, Product as DbProduct, ProductChanges,
};
use crate::models::product_image::{NewProductImage, ProductImage as DbProductImage};
use crate::repository::{DieselRepository, ProductReader, ProductWriter, RepositoryResult};

fn insert_images(
    conn: &mut SqliteConnection,
    product_id: i32,
    images: &ImageSlots,
) -> QueryResult<usize> {
    use crate::schema::product_images;

    let rows = NewProductImage::rows_for(product_id, images);
    if rows.is_empty() {
        return Ok(0);
    }
    diesel::insert_into(product_images::table)
        .values(&rows)
        .execute(conn)
}

impl ProductReader for DieselRepository {
    fn list_products(&self) -> RepositoryResult<Vec<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let rows = products::table
            .order(products::id.asc())
            .select(DbProduct::as_select())
            .load::<DbProduct>(&mut conn)?;

        let images = DbProductImage::belonging_to(&rows)
            .select(DbProductImage::as_select())
            .load::<DbProductImage>(&mut conn)?;

        let items = images
            .grouped_by(&rows)
            .into_iter()
            .zip(rows)
            .map(|(images, product)| Product::try_from((product, images)))
            .collect::<Result<Vec<Product>, _>>()?;

        Ok(items)
    }

    fn get_product_by_id(&self, id: ProductId) -> RepositoryResult<Option<Product>> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let Some(product) = products::table
            .find(id.get())
            .select(DbProduct::as_select())
            .first::<DbProduct>(&mut conn)
            .optional()?
        else {
            return Ok(None);
        };

        let images = DbProductImage::belonging_to(&product)
            .select(DbProductImage::as_select())
            .load::<DbProductImage>(&mut conn)?;

        Ok(Some(Product::try_from((product, images))?))
    }
}

impl ProductWriter for DieselRepository {
    fn create_product(&self, product: &NewProduct) -> RepositoryResult<Product> {
        use crate::schema::products;

        let mut conn = self.conn()?;

        let (row, images) = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let row = diesel::insert_into(products::table)
                .values(DbNewProduct::from(product))
                .returning(DbProduct::as_returning())
                .get_result::<DbProduct>(conn)?;

            insert_images(conn, row.id, &product.images)?;

            let images = DbProductImage::belonging_to(&row)
                .select(DbProductImage::as_select())
                .load::<DbProductImage>(conn)?;

            Ok((row, images))
        })?;

        Ok(Product::try_from((row, images))?)
    }

    fn update_product(&self, product: &Product) -> RepositoryResult<usize> {
        use crate::schema::{product_images, products};

        let mut conn = self.conn()?;

        let affected = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            let affected = diesel::update(products::table.find(product.id.get()))
                .set(ProductChanges::from(product))
                .execute(conn)?;
            if affected == 0 {
                return Ok(0);
            }

            diesel::delete(
                product_images::table.filter(product_images::product_id.eq(product.id.get())),
            )
            .execute(conn)?;
            insert_images(conn, product.id.get(), &product.images)?;

            Ok(affected)
        })?;

        Ok(affected)
    }

    fn delete_product(&self, id: ProductId) -> RepositoryResult<usize> {
        use crate::schema::{product_images, products};

        let mut conn = self.conn()?;

        let affected = conn.transaction::<_, diesel::result::Error, _>(|conn| {
            diesel::delete(product_images::table.filter(product_images::product_id.eq(id.get())))
                .execute(conn)?;
            diesel::delete(products::table.find(id.get())).execute(conn)
        })?;

        Ok(affected)
    }
}
