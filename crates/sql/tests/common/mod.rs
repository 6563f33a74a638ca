use duckquery_sql::JoinContext;

/// Working table `employees`-shaped, plus `dept` and `region` registered in
/// that order.
#[allow(dead_code)]
pub fn employee_context() -> JoinContext {
    let mut ctx = JoinContext::new("current_df", ["id", "name", "dept_id", "salary"]);
    ctx.register("dept", ["id", "dept_id", "dept_name", "region_id"]);
    ctx.register("region", ["region_id", "region_name", "dept_name"]);
    ctx
}

#[allow(dead_code)]
pub fn sales_context() -> JoinContext {
    let mut ctx = JoinContext::new("current_df", ["region", "quarter", "amount"]);
    ctx.register("targets", ["region", "target"]);
    ctx
}
